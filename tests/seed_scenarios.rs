//! Integration tests wiring `FolderStore` + `FolderRetrieval` (and, for the
//! quality-floor scenario, raw `Storage` writes standing in for the
//! orchestrator's commit) together over a few of the spec's seed search
//! scenarios: filename-exact ranking, hybrid keyword boosting, and
//! quality-floor exclusion from folder previews and listings.
//!
//! Query embeddings are supplied by a small fixed-vector test double rather
//! than the hash-based [`NullEmbeddingService`], so the expected cosine
//! similarities and fused scores are exact numbers rather than values that
//! depend on hash-bucket placement.

use async_trait::async_trait;
use chrono::Utc;
use folder_semantic_index::domain::ports::embedding::EmbeddingService;
use folder_semantic_index::domain::types::{
    Chunk, Document, Embedding, ExtractionMethod, ExtractionStrategy, ModelCapabilities,
    ParseStatus, PrefixFormat,
};
use folder_semantic_index::{FolderRetrieval, RetrievalEngine};
use folder_semantic_index::adapters::storage::FolderStore;
use folder_semantic_index::application::embedding_pool::EmbeddingWorkerPool;
use folder_semantic_index::domain::ports::storage::Storage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Returns the exact vector registered for a known query string. Unlike
/// [`NullEmbeddingService`], there is no hashing involved, so the cosine
/// similarity against any hand-picked chunk vector is computable by hand.
struct FixedVectorEmbeddingService {
    queries: HashMap<&'static str, Vec<f32>>,
    dimensions: usize,
}

impl FixedVectorEmbeddingService {
    fn new(dimensions: usize, queries: &[(&'static str, Vec<f32>)]) -> Self {
        Self {
            queries: queries.iter().cloned().collect(),
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingService for FixedVectorEmbeddingService {
    async fn embed(&self, text: &str) -> folder_semantic_index::Result<Vec<f32>> {
        Ok(self
            .queries
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dimensions]))
    }

    async fn embed_batch(&self, texts: &[String]) -> folder_semantic_index::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            model_id: "fixed-vector-test".to_string(),
            requires_prefix: false,
            prefix_format: PrefixFormat::default(),
            requires_normalization: false,
            extraction_strategy: ExtractionStrategy::Rich,
        }
    }
}

fn doc(id: &str, path: &str, status: ParseStatus) -> Document {
    Document {
        id: id.to_string(),
        path: PathBuf::from(path),
        content_hash: 1,
        parser: "plain_text".to_string(),
        status,
        semantic_summary: None,
        last_processed_at: Utc::now(),
    }
}

fn chunk(document_id: &str, index: i64, text: &str, vector: Vec<f32>) -> Chunk {
    Chunk {
        document_id: document_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
        span: if index < 0 { None } else { Some((0, text.len())) },
        heading: None,
        topics: Vec::new(),
        key_phrases: Vec::new(),
        readability: Some(50.0),
        embedding: Some(Embedding {
            dimensions: vector.len(),
            vector,
            model: "fixed-vector-test".to_string(),
        }),
        extraction_method: ExtractionMethod::Rich,
        extraction_confidence: 0.9,
    }
}

/// §4.8 step 3: the filename chunk lives in the same unified vector index
/// as content chunks, and its boost is computed off the real embedding
/// cosine, not a lexical overlap score. A near-exact filename match (cosine
/// >= 0.9) should out-rank two partial matches and both should out-rank
/// content-only hits, even though all three documents share the same
/// (low-similarity) content chunk.
#[tokio::test]
async fn filename_exact_match_outranks_partial_and_content_hits() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FolderStore::open(dir.path()).await.unwrap());

    let content_vector = vec![0.2, 0.9798]; // cosine 0.2 against the query below, shared by all three docs
    for (doc_id, path, filename_vector) in [
        ("d_v1", "budget_q4_2025_v1.txt", vec![0.75, 0.6614]), // cosine 0.75: filename_partial
        ("d_v2", "budget_q4_2025_v2.txt", vec![1.0, 0.0]),     // cosine 1.0: filename_exact
        ("d_v3", "budget_q4_2025_v3.txt", vec![0.72, 0.694]),  // cosine 0.72: filename_partial
    ] {
        storage
            .upsert_document(
                doc(doc_id, path, ParseStatus::Ok),
                vec![
                    chunk(doc_id, 0, "quarterly figures and narrative commentary", content_vector.clone()),
                    chunk(doc_id, -1, "budget q4 2025 v", filename_vector),
                ],
            )
            .await
            .unwrap();
    }

    let embeddings = Arc::new(EmbeddingWorkerPool::with_defaults(Arc::new(
        FixedVectorEmbeddingService::new(2, &[("budget q4 2025 v2", vec![1.0, 0.0])]),
    )));
    let retrieval = FolderRetrieval::new(dir.path().to_path_buf(), storage, embeddings);

    let response = retrieval.search("budget q4 2025 v2", 3).await.unwrap();
    assert_eq!(response.hits.len(), 3);

    let top = &response.hits[0];
    assert_eq!(top.document_id, "d_v2");
    assert!(top.similarity >= 0.9);
    assert_eq!(top.match_type, folder_semantic_index::MatchType::FilenameExact);
    assert!((top.final_score - 0.72).abs() < 1e-3);

    // Both partial matches rank above the shared content-only hits (0.2
    // final score each) but below the exact match.
    let partials: Vec<&str> = response.hits[1..]
        .iter()
        .map(|h| h.document_id.as_str())
        .collect();
    assert!(partials.contains(&"d_v1"));
    assert!(partials.contains(&"d_v3"));
    for hit in &response.hits[1..] {
        assert_eq!(hit.match_type, folder_semantic_index::MatchType::FilenamePartial);
        assert!(hit.final_score < top.final_score);
    }
}

/// §4.8 step 4: a poor-tokenizing term present in the query gets a keyword
/// scan pass alongside semantic search. A chunk that matches both semantic
/// top-K and the keyword scan is hybrid-boosted; a chunk that matches only
/// the keyword scan (because it fell out of the top-K window entirely) is
/// still surfaced at the fixed keyword-only score.
#[tokio::test]
async fn hybrid_boost_and_keyword_only_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FolderStore::open(dir.path()).await.unwrap());

    storage
        .upsert_document(
            doc("d_tmoat", "tmoat_guide.txt", ParseStatus::Ok),
            vec![chunk(
                "d_tmoat",
                0,
                "Guide to using TMOAT for automated testing.",
                vec![0.9, 0.436], // cosine 0.9 against the query: lands in the top-K
            )],
        )
        .await
        .unwrap();

    storage
        .upsert_document(
            doc("d_bge", "bge_overview.txt", ParseStatus::Ok),
            vec![chunk(
                "d_bge",
                0,
                "Overview of the BGE-M3 embedding model architecture.",
                vec![0.0, 1.0], // cosine 0.0: falls out of the top-K once distractors outrank it
            )],
        )
        .await
        .unwrap();

    for i in 0..7 {
        storage
            .upsert_document(
                doc(&format!("d_distractor_{i}"), &format!("distractor_{i}.txt"), ParseStatus::Ok),
                vec![chunk(
                    &format!("d_distractor_{i}"),
                    0,
                    "An unrelated paragraph about quarterly planning.",
                    vec![0.3, 0.9539], // cosine 0.3: ranks between TMOAT and BGE-M3
                )],
            )
            .await
            .unwrap();
    }

    let query = "How to use TMOAT with BGE-M3 model";
    let embeddings = Arc::new(EmbeddingWorkerPool::with_defaults(Arc::new(
        FixedVectorEmbeddingService::new(2, &[(query, vec![1.0, 0.0])]),
    )));
    let retrieval = FolderRetrieval::new(dir.path().to_path_buf(), storage, embeddings);

    let response = retrieval.search(query, 2).await.unwrap();
    assert_eq!(response.hits.len(), 2);
    assert!(response.insights.poor_tokenizers_detected.contains(&"tmoat".to_string()));
    assert!(response.insights.poor_tokenizers_detected.contains(&"bge-m3".to_string()));

    let tmoat = response
        .hits
        .iter()
        .find(|h| h.document_id == "d_tmoat")
        .expect("tmoat hit present");
    assert_eq!(tmoat.semantic_context.search_strategy, folder_semantic_index::SearchStrategy::HybridBoosted);
    assert!((tmoat.final_score - 1.17).abs() < 1e-3);

    let bge = response
        .hits
        .iter()
        .find(|h| h.document_id == "d_bge")
        .expect("bge-m3 hit recovered via keyword scan despite falling out of the semantic top-K");
    assert_eq!(bge.semantic_context.search_strategy, folder_semantic_index::SearchStrategy::KeywordOnly);
    assert_eq!(bge.similarity, 0.0);
    assert!((bge.final_score - 0.75).abs() < 1e-6);
}

/// §7: a document whose aggregation fails the quality floor is excluded
/// from folder listings and preview frequency counts; its previous
/// successful version (if any) is what stays authoritative, and any rows
/// recorded under `failed_quality` never surface as a document summary.
#[tokio::test]
async fn failed_quality_documents_are_excluded_from_listings_and_previews() {
    use folder_semantic_index::domain::types::{DocumentSemanticSummary, ScoredTerm};

    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FolderStore::open(dir.path()).await.unwrap());

    let good_summary = DocumentSemanticSummary {
        top_topics: vec![ScoredTerm { term: "alpha".to_string(), score: 1.0 }],
        top_key_phrases: Vec::new(),
        avg_readability: 55.0,
        topic_diversity: 0.5,
        phrase_richness: 0.7,
        semantic_coherence: 0.8,
        extraction_method: ExtractionMethod::Rich,
        coverage: 1.0,
        confidence: 0.9,
        processing_time_ms: 1,
        primary_theme: Some("alpha".to_string()),
    };
    let mut good_doc = doc("d_good", "good.txt", ParseStatus::Ok);
    good_doc.semantic_summary = Some(good_summary);
    storage
        .upsert_document(good_doc, vec![chunk("d_good", 0, "alpha content", vec![1.0, 0.0])])
        .await
        .unwrap();

    let mut failed_doc = doc("d_failed", "failed.txt", ParseStatus::FailedQuality);
    failed_doc.semantic_summary = Some(DocumentSemanticSummary {
        top_topics: vec![ScoredTerm { term: "gamma".to_string(), score: 1.0 }],
        top_key_phrases: Vec::new(),
        avg_readability: 10.0,
        topic_diversity: 0.1,
        phrase_richness: 0.1,
        semantic_coherence: 0.1,
        extraction_method: ExtractionMethod::Rich,
        coverage: 0.2,
        confidence: 0.2,
        processing_time_ms: 1,
        primary_theme: Some("gamma".to_string()),
    });
    storage
        .upsert_document(failed_doc, vec![chunk("d_failed", 0, "gamma content", vec![0.0, 1.0])])
        .await
        .unwrap();

    let embeddings = Arc::new(EmbeddingWorkerPool::with_defaults(Arc::new(
        folder_semantic_index::adapters::providers::embedding::null::NullEmbeddingService::new(2),
    )));
    let retrieval = FolderRetrieval::new(dir.path().to_path_buf(), storage.clone(), embeddings);

    let summaries = retrieval.list_documents(dir.path()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "d_good");

    let documents = storage.query_documents_under(&PathBuf::new(), true).await.unwrap();
    let preview = folder_semantic_index::application::folder_aggregator::aggregate(&documents);
    let topic_terms: Vec<&str> = preview.top_topics.iter().map(|t| t.as_str()).collect();
    assert!(topic_terms.contains(&"alpha"));
    assert!(!topic_terms.contains(&"gamma"));

    // The failed-quality document's chunks are still retrievable directly
    // by id — exclusion applies to listings/previews, not raw lookup.
    let outline = retrieval.get_document_outline("d_failed").await.unwrap();
    assert_eq!(outline.len(), 1);
}
