//! Vector index over embedded chunks: build, persist, load, and
//! nearest-neighbour search.

pub mod build;
pub mod index;
pub mod search;
pub mod store;

pub use build::build;
pub use index::{DocumentRecord, IndexEntry, IndexManifest, VectorIndex, FORMAT_VERSION};
pub use search::{cosine_similarity, ScoredChunk};
pub use store::{index_exists, load, load_manifest, persist, INDEX_FILE, META_FILE};
