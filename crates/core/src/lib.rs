pub mod config;
pub mod error;
pub mod params;

pub use config::Config;
pub use error::*;
pub use params::ChunkParams;
