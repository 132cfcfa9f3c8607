use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pdfrag_core::RagError;
use tracing::info;

use crate::index::{IndexManifest, VectorIndex, FORMAT_VERSION};

pub const INDEX_FILE: &str = "index.bin";
pub const META_FILE: &str = "meta.json";

const ZSTD_LEVEL: i32 = 3;

pub fn index_exists(storage_dir: &Path) -> bool {
    storage_dir.join(INDEX_FILE).is_file()
}

/// Write `index.bin` (zstd-compressed MessagePack) and `meta.json` into
/// `storage_dir`, replacing any previous version.
pub fn persist(index: &VectorIndex, storage_dir: &Path) -> Result<(), RagError> {
    fs::create_dir_all(storage_dir)?;

    let encoded =
        rmp_serde::to_vec_named(index).map_err(|e| RagError::Serialize(e.to_string()))?;
    let raw_bytes = encoded.len();

    let index_path = storage_dir.join(INDEX_FILE);
    write_atomic(&index_path, |file| {
        let mut encoder = zstd::Encoder::new(file, ZSTD_LEVEL)?;
        encoder.write_all(&encoded)?;
        encoder.finish()?.flush()
    })?;

    let meta_json = serde_json::to_string_pretty(&index.manifest())
        .map_err(|e| RagError::Serialize(e.to_string()))?;
    write_atomic(&storage_dir.join(META_FILE), |file| {
        file.write_all(meta_json.as_bytes())?;
        file.write_all(b"\n")
    })?;

    let compressed = fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0);
    info!(
        "Index saved to {}: {} chunks from {} documents, {} bytes ({} raw)",
        storage_dir.display(),
        index.len(),
        index.document_count(),
        compressed,
        raw_bytes
    );
    Ok(())
}

/// Load a persisted index from `storage_dir`.
pub fn load(storage_dir: &Path) -> Result<VectorIndex, RagError> {
    let index_path = storage_dir.join(INDEX_FILE);
    if !index_path.is_file() {
        return Err(RagError::IndexNotFound(storage_dir.to_path_buf()));
    }

    let file = fs::File::open(&index_path)?;
    let decompressed = zstd::decode_all(std::io::BufReader::new(file)).map_err(|e| corrupt(&index_path, e))?;
    let index: VectorIndex =
        rmp_serde::from_slice(&decompressed).map_err(|e| corrupt(&index_path, e))?;

    if index.format_version != FORMAT_VERSION {
        return Err(corrupt(
            &index_path,
            format!(
                "unsupported format version {} (expected {})",
                index.format_version, FORMAT_VERSION
            ),
        ));
    }
    if let Some(bad) = index.entries.iter().find(|e| e.vector.len() != index.dimensions) {
        return Err(corrupt(
            &index_path,
            format!(
                "chunk {} has {} dimensions, expected {}",
                bad.chunk.id,
                bad.vector.len(),
                index.dimensions
            ),
        ));
    }

    info!(
        "Loaded index from {}: {} chunks from {} documents",
        storage_dir.display(),
        index.len(),
        index.document_count()
    );
    Ok(index)
}

/// Read only the manifest; cheap status reporting without decoding vectors.
pub fn load_manifest(storage_dir: &Path) -> Result<IndexManifest, RagError> {
    let path = storage_dir.join(META_FILE);
    if !path.is_file() {
        return Err(RagError::IndexNotFound(storage_dir.to_path_buf()));
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|e| corrupt(&path, e))
}

fn corrupt(path: &Path, reason: impl ToString) -> RagError {
    RagError::IndexCorrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Write through a sibling temp file and rename it over `path`.
fn write_atomic<F>(path: &Path, write: F) -> Result<(), RagError>
where
    F: FnOnce(&mut std::io::BufWriter<fs::File>) -> std::io::Result<()>,
{
    let tmp: PathBuf = path.with_extension("tmp");
    let result = (|| {
        let mut buf = std::io::BufWriter::new(fs::File::create(&tmp)?);
        write(&mut buf)?;
        let file = buf.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result.map_err(RagError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DocumentRecord, IndexEntry};
    use pdfrag_ingest::Chunk;

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::empty("nomic-embed-text:latest", 3, 512, 50);
        index.documents.push(DocumentRecord {
            id: "d1".into(),
            source: "france.pdf".into(),
            path: "pdfs/france.pdf".into(),
            page_count: 1,
            title: Some("The capital of France is Paris.".into()),
            chunk_count: 1,
        });
        index.entries.push(IndexEntry {
            chunk: Chunk {
                id: "d1:0".into(),
                document_id: "d1".into(),
                source: "france.pdf".into(),
                index: 0,
                text: "The capital of France is Paris.".into(),
                start: 0,
                end: 31,
                token_count: 6,
                page_number: 1,
            },
            vector: vec![0.1, 0.2, 0.3],
        });
        index
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        persist(&index, dir.path()).unwrap();

        assert!(index_exists(dir.path()));
        assert!(dir.path().join(META_FILE).is_file());
        assert!(!dir.path().join("index.tmp").exists());

        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded, index);

        let manifest = load_manifest(dir.path()).unwrap();
        assert_eq!(manifest.chunk_count, 1);
        assert_eq!(manifest.documents[0].source, "france.pdf");
    }

    #[test]
    fn persisting_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();

        persist(&index, dir.path()).unwrap();
        let first_bin = fs::read(dir.path().join(INDEX_FILE)).unwrap();
        let first_meta = fs::read(dir.path().join(META_FILE)).unwrap();

        persist(&index, dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join(INDEX_FILE)).unwrap(), first_bin);
        assert_eq!(fs::read(dir.path().join(META_FILE)).unwrap(), first_meta);
    }

    #[test]
    fn persist_overwrites_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        persist(&sample_index(), dir.path()).unwrap();

        let empty = VectorIndex::empty("nomic-embed-text:latest", 3, 256, 20);
        persist(&empty, dir.path()).unwrap();

        let loaded = load(dir.path()).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.chunk_size, 256);
    }

    #[test]
    fn missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nowhere")).unwrap_err();
        assert!(matches!(err, RagError::IndexNotFound(_)));
        assert!(matches!(load_manifest(dir.path()).unwrap_err(), RagError::IndexNotFound(_)));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), b"definitely not zstd").unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, RagError::IndexCorrupt { .. }), "got {err:?}");
    }

    #[test]
    fn valid_zstd_with_bad_payload_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let payload = zstd::encode_all(&b"\xc1\xc1\xc1"[..], 3).unwrap();
        fs::write(dir.path().join(INDEX_FILE), payload).unwrap();
        assert!(matches!(load(dir.path()).unwrap_err(), RagError::IndexCorrupt { .. }));
    }

    #[test]
    fn future_format_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = sample_index();
        index.format_version = FORMAT_VERSION + 1;
        persist(&index, dir.path()).unwrap();
        assert!(matches!(load(dir.path()).unwrap_err(), RagError::IndexCorrupt { .. }));
    }
}
