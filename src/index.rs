use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

/// Flat inner-product nearest-neighbor index.
///
/// Vectors are expected to be unit length, so inner product equals
/// cosine similarity. Search is an exhaustive scan; positions in the
/// index correspond 1:1 to chunk positions in the chunk store.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlatIpIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn build(dim: usize, vectors: Vec<Vec<f32>>) -> IndexResult<Self> {
        for v in &vectors {
            if v.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: v.len(),
                });
            }
        }
        Ok(Self { dim, vectors })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors in the index; used for alignment verification.
    pub fn total_count(&self) -> usize {
        self.vectors.len()
    }

    /// Top-k positions by inner product, best first.
    pub fn search(&self, query: &[f32], top_k: usize) -> IndexResult<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, inner_product(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    pub fn save(&self, path: &Path) -> IndexResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> IndexResult<Self> {
        if !path.is_file() {
            return Err(IndexError::IndexNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let index = serde_json::from_reader(BufReader::new(file))?;
        Ok(index)
    }
}

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
