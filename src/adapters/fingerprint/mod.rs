//! Fingerprint & Change Detector (§4.1): enumerates a folder, computes
//! per-file content hashes, and diffs against the previous snapshot.

use crate::domain::constants::{FINGERPRINT_FULL_HASH_MAX_BYTES, FINGERPRINT_PARTIAL_SAMPLE_BYTES};
use crate::domain::types::FailureRecord;
use chrono::Utc;
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A single file's fingerprint: size, mtime, and content hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileFingerprint {
    /// Size in bytes.
    pub size: u64,
    /// Last-modified time, as Unix seconds (filesystem precision varies).
    pub mtime_unix: i64,
    /// Content hash: streamed for files under the size threshold, or
    /// `H(size, mtime, first N bytes, last N bytes)` above it.
    pub hash: u64,
}

/// A full folder snapshot: relative path to fingerprint.
pub type Snapshot = HashMap<PathBuf, FileFingerprint>;

/// The result of diffing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Paths present in `cur` but not `prev`.
    pub added: Vec<PathBuf>,
    /// Paths present in both, with a changed hash.
    pub modified: Vec<PathBuf>,
    /// Paths present in `prev` but not `cur`.
    pub deleted: Vec<PathBuf>,
}

/// Walks `root`, honoring `.gitignore`-style ignore files and the given
/// include-extension allowlist (empty = accept all extensions reachable by
/// a registered parser), and computes a content fingerprint for each file.
///
/// Unreadable files produce a [`FailureRecord`] and are excluded from the
/// snapshot (and therefore never appear in `added`/`modified`).
pub fn snapshot(root: &Path, include_extensions: &[String]) -> (Snapshot, Vec<FailureRecord>) {
    let mut out = Snapshot::new();
    let mut failures = Vec::new();

    let walker = WalkBuilder::new(root).hidden(false).build();
    for entry in walker.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !include_extensions.is_empty() {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            match ext {
                Some(ext) if include_extensions.contains(&ext) => {}
                _ => continue,
            }
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        match fingerprint_file(path) {
            Ok(fp) => {
                out.insert(relative, fp);
            }
            Err(message) => failures.push(FailureRecord {
                scope: crate::domain::types::FailureScope::Storage,
                document_id: relative.display().to_string(),
                chunk_index: None,
                message,
                attempts: 1,
                first_seen_at: Utc::now(),
                last_seen_at: Utc::now(),
            }),
        }
    }

    (out, failures)
}

fn fingerprint_file(path: &Path) -> Result<FileFingerprint, String> {
    let metadata = std::fs::metadata(path).map_err(|e| e.to_string())?;
    let size = metadata.len();
    let mtime_unix = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let hash = if size > FINGERPRINT_FULL_HASH_MAX_BYTES {
        partial_hash(path, size, mtime_unix).map_err(|e| e.to_string())?
    } else {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        seahash::hash(&bytes)
    };

    Ok(FileFingerprint {
        size,
        mtime_unix,
        hash,
    })
}

/// Fallback hash for files above [`FINGERPRINT_FULL_HASH_MAX_BYTES`]:
/// `H(size, mtime, first N bytes, last N bytes)`, avoiding a full stream
/// read on very large files.
fn partial_hash(path: &Path, size: u64, mtime_unix: i64) -> std::io::Result<u64> {
    let sample = FINGERPRINT_PARTIAL_SAMPLE_BYTES as u64;
    let mut file = File::open(path)?;
    let mut head = vec![0u8; sample.min(size) as usize];
    file.read_exact(&mut head)?;

    let mut tail = vec![0u8; sample.min(size) as usize];
    if size > sample {
        use std::io::{Seek, SeekFrom};
        file.seek(SeekFrom::End(-(tail.len() as i64)))?;
        file.read_exact(&mut tail)?;
    } else {
        tail.clone_from(&head);
    }

    let mut buf = Vec::with_capacity(16 + head.len() + tail.len());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&mtime_unix.to_le_bytes());
    buf.extend_from_slice(&head);
    buf.extend_from_slice(&tail);
    Ok(seahash::hash(&buf))
}

/// Diffs `prev` against `cur`. `modified` iff the hash differs; mtime/size
/// alone never trigger a modification (content is the address).
pub fn diff(prev: &Snapshot, cur: &Snapshot) -> Diff {
    let mut out = Diff::default();
    for (path, fp) in cur {
        match prev.get(path) {
            None => out.added.push(path.clone()),
            Some(prev_fp) if prev_fp.hash != fp.hash => out.modified.push(path.clone()),
            Some(_) => {}
        }
    }
    for path in prev.keys() {
        if !cur.contains_key(path) {
            out.deleted.push(path.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_added_modified_deleted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("b.txt"), "world").unwrap();
        let (prev, _) = snapshot(dir.path(), &[]);

        fs::write(dir.path().join("a.txt"), "hello changed").unwrap();
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        fs::write(dir.path().join("c.txt"), "new file").unwrap();
        let (cur, _) = snapshot(dir.path(), &[]);

        let d = diff(&prev, &cur);
        assert_eq!(d.added, vec![PathBuf::from("c.txt")]);
        assert_eq!(d.modified, vec![PathBuf::from("a.txt")]);
        assert_eq!(d.deleted, vec![PathBuf::from("b.txt")]);
    }

    #[test]
    fn unchanged_content_is_not_modified() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "stable content").unwrap();
        let (prev, _) = snapshot(dir.path(), &[]);
        let (cur, _) = snapshot(dir.path(), &[]);
        let d = diff(&prev, &cur);
        assert!(d.added.is_empty() && d.modified.is_empty() && d.deleted.is_empty());
    }

    #[test]
    fn extension_filter_excludes_other_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "text").unwrap();
        fs::write(dir.path().join("b.bin"), "binary").unwrap();
        let (snap, _) = snapshot(dir.path(), &["txt".to_string()]);
        assert_eq!(snap.len(), 1);
        assert!(snap.contains_key(&PathBuf::from("a.txt")));
    }
}
