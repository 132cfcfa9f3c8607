use crate::error::RagError;

/// Token-window parameters for the chunker.
///
/// Construct through [`ChunkParams::new`] so that `size > 0` and
/// `overlap < size` hold everywhere a value of this type exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    size: usize,
    overlap: usize,
}

impl ChunkParams {
    pub const DEFAULT_SIZE: usize = 512;
    pub const DEFAULT_OVERLAP: usize = 50;

    pub fn new(size: usize, overlap: usize) -> Result<Self, RagError> {
        if size == 0 || overlap >= size {
            return Err(RagError::InvalidChunkParams { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Maximum tokens per chunk.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tokens shared between adjacent chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let params = ChunkParams::default();
        assert_eq!(params.size(), 512);
        assert_eq!(params.overlap(), 50);
    }

    #[test]
    fn rejects_zero_size() {
        let err = ChunkParams::new(0, 0).unwrap_err();
        assert!(matches!(err, RagError::InvalidChunkParams { size: 0, overlap: 0 }));
    }

    #[test]
    fn rejects_overlap_not_below_size() {
        assert!(ChunkParams::new(10, 10).is_err());
        assert!(ChunkParams::new(10, 11).is_err());
        assert!(ChunkParams::new(10, 9).is_ok());
    }

    #[test]
    fn zero_overlap_is_valid() {
        let params = ChunkParams::new(1, 0).unwrap();
        assert_eq!(params.size(), 1);
        assert_eq!(params.overlap(), 0);
    }
}
