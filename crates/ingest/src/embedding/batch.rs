use tracing::{debug, info};

use super::traits::{Embedder, EmbeddingError};

/// Embed `texts` in fixed-size batches, returning one vector per text in
/// input order. A batch failure aborts the whole run.
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[&str],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let batch_size = batch_size.max(1);
    let total_batches = texts.len().div_ceil(batch_size);
    let mut out = Vec::with_capacity(texts.len());

    for (i, batch) in texts.chunks(batch_size).enumerate() {
        debug!("Embedding batch {}/{} ({} texts)", i + 1, total_batches, batch.len());
        let embeddings = embedder.embed_batch(batch).await?;
        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                actual: embeddings.len(),
            });
        }
        out.extend(embeddings);
    }

    if !texts.is_empty() {
        info!(
            "Embedded {} chunks in {} batches with {}",
            texts.len(),
            total_batches,
            embedder.model()
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEmbedder {
        call_count: AtomicUsize,
        fail_on_call: Option<usize>,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail_on_call: None,
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(EmbeddingError::Api("model not found".into()));
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn splits_into_batches_and_keeps_order() {
        let embedder = FakeEmbedder::new();
        let texts = ["a", "bb", "ccc", "dddd", "eeeee"];
        let vectors = embed_in_batches(&embedder, &texts, 2).await.unwrap();
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 3);
        let lens: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lens, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let embedder = FakeEmbedder::new();
        let vectors = embed_in_batches(&embedder, &[], 64).await.unwrap();
        assert!(vectors.is_empty());
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn batch_failure_aborts() {
        let embedder = FakeEmbedder {
            call_count: AtomicUsize::new(0),
            fail_on_call: Some(1),
        };
        let texts = ["a", "b", "c"];
        let err = embed_in_batches(&embedder, &texts, 1).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Api(_)));
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_batch_size_is_treated_as_one() {
        let embedder = FakeEmbedder::new();
        let texts = ["a", "b"];
        embed_in_batches(&embedder, &texts, 0).await.unwrap();
        assert_eq!(embedder.call_count.load(Ordering::SeqCst), 2);
    }
}
