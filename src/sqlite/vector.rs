//! Embedding BLOB conversion and cosine similarity computation.

use super::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Convert a vector of f32 embedding values to a BLOB (little-endian bytes).
///
/// # Errors
///
/// Returns `Error::MismatchedDimensions` if the vector length is not exactly
/// `dims`.
pub fn vec_to_blob(vec: &[f32], dims: usize) -> Result<Vec<u8>> {
    if vec.len() != dims {
        return Err(Error::MismatchedDimensions {
            expected: dims,
            actual: vec.len(),
        });
    }
    Ok(vec.iter().flat_map(|&x| x.to_le_bytes()).collect())
}

/// Convert a BLOB (little-endian bytes) to a vector of f32 embedding values.
///
/// # Errors
///
/// Returns `Error::InvalidBlobSize` if the blob length is not exactly
/// `dims * 4` bytes.
pub fn blob_to_vec(blob: &[u8], dims: usize) -> Result<Vec<f32>> {
    let expected = dims * 4;
    if blob.len() != expected {
        return Err(Error::InvalidBlobSize {
            expected,
            actual: blob.len(),
        });
    }
    let mut vec = Vec::with_capacity(dims);
    for chunk in blob.chunks_exact(4) {
        let val = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        vec.push(val);
    }
    Ok(vec)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Dot product divided by the product of magnitudes, accumulated in f64.
/// A zero-magnitude vector yields 0.0 rather than a division error. No
/// assumption is made that inputs are pre-normalized.
///
/// # Errors
///
/// - Returns `Error::EmptyVector` if either vector is empty.
/// - Returns `Error::MismatchedDimensions` if vectors have different lengths.
/// - Returns `Error::InvalidEmbedding` if any value is NaN or infinite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(Error::EmptyVector);
    }

    if a.len() != b.len() {
        return Err(Error::MismatchedDimensions {
            expected: a.len(),
            actual: b.len(),
        });
    }

    if a.iter().any(|x| x.is_nan() || x.is_infinite())
        || b.iter().any(|x| x.is_nan() || x.is_infinite())
    {
        return Err(Error::InvalidEmbedding(
            "Vector contains NaN or infinite values".to_string(),
        ));
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{orthogonal_embeddings, test_embedding, TEST_DIMS};
    use super::*;

    #[test]
    fn test_vec_to_blob_correct_dimensions() {
        let vec = test_embedding(0.1);
        let blob = vec_to_blob(&vec, TEST_DIMS).unwrap();
        assert_eq!(blob.len(), TEST_DIMS * 4);
    }

    #[test]
    fn test_vec_to_blob_wrong_dimensions() {
        let vec = vec![0.1f32; TEST_DIMS + 3];
        assert!(matches!(
            vec_to_blob(&vec, TEST_DIMS),
            Err(Error::MismatchedDimensions { .. })
        ));
    }

    #[test]
    fn test_blob_round_trip() {
        let original = test_embedding(0.123);
        let blob = vec_to_blob(&original, TEST_DIMS).unwrap();
        let decoded = blob_to_vec(&blob, TEST_DIMS).unwrap();
        assert_eq!(original.len(), decoded.len());
        for (o, d) in original.iter().zip(decoded.iter()) {
            assert!((o - d).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_blob_to_vec_wrong_size() {
        let blob = vec![0u8; TEST_DIMS * 4 - 1];
        assert!(matches!(
            blob_to_vec(&blob, TEST_DIMS),
            Err(Error::InvalidBlobSize { .. })
        ));
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let vec = test_embedding(1.0);
        let sim = cosine_similarity(&vec, &vec).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let (a, b) = orthogonal_embeddings();
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite_vectors() {
        let a = test_embedding(1.0);
        let b = test_embedding(-1.0);
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_magnitude_independent() {
        // Same direction, different magnitudes: still 1.0
        let a = test_embedding(0.5);
        let b = test_embedding(2.0);
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let zero = vec![0.0f32; TEST_DIMS];
        let vec = test_embedding(1.0);
        let sim = cosine_similarity(&zero, &vec).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_similarity_empty_vector() {
        let empty: Vec<f32> = vec![];
        let vec = test_embedding(1.0);
        assert!(matches!(
            cosine_similarity(&empty, &vec),
            Err(Error::EmptyVector)
        ));
    }

    #[test]
    fn test_cosine_similarity_mismatched_dimensions() {
        let a = test_embedding(1.0);
        let b = vec![1.0f32; TEST_DIMS + 1];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(Error::MismatchedDimensions { .. })
        ));
    }

    #[test]
    fn test_cosine_similarity_nan_values() {
        let mut a = test_embedding(1.0);
        a[0] = f32::NAN;
        let b = test_embedding(1.0);
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(Error::InvalidEmbedding(_))
        ));
    }

    #[test]
    fn test_cosine_similarity_infinite_values() {
        let mut a = test_embedding(1.0);
        a[0] = f32::INFINITY;
        let b = test_embedding(1.0);
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(Error::InvalidEmbedding(_))
        ));
    }
}
