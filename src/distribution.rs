use crate::phenotype::{Label, Phenotype};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Share of offspring showing one phenotype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeBucket {
    pub name: Label,
    pub probability: f64,
    pub color: String,
}

/// Offspring phenotype distribution of one cross.
///
/// Buckets are sorted by descending probability, ties by name, and only
/// contain phenotypes that occur at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    buckets: Vec<PhenotypeBucket>,
    total: usize,
    unresolved: usize,
}

impl Distribution {
    /// Buckets resolved phenotypes and turns counts into probabilities.
    pub fn aggregate<I>(phenotypes: I) -> Self
    where
        I: IntoIterator<Item = Phenotype>,
    {
        let mut counts: HashMap<Label, (usize, String)> = HashMap::new();
        let mut total = 0;
        let mut unresolved = 0;
        for phenotype in phenotypes {
            total += 1;
            if !phenotype.resolved {
                unresolved += 1;
            }
            counts
                .entry(phenotype.name)
                .or_insert((0, phenotype.color))
                .0 += 1;
        }

        let mut buckets: Vec<PhenotypeBucket> = counts
            .into_iter()
            .map(|(name, (count, color))| PhenotypeBucket {
                name,
                probability: count as f64 / total as f64,
                color,
            })
            .collect();
        buckets.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            buckets,
            total,
            unresolved,
        }
    }

    /// Buckets with probabilities in `0..=1`.
    pub fn buckets(&self) -> &[PhenotypeBucket] {
        &self.buckets
    }

    /// Buckets with probabilities in `0..=100`, the shape charts expect.
    pub fn percentages(&self) -> Vec<PhenotypeBucket> {
        self.buckets
            .iter()
            .map(|bucket| PhenotypeBucket {
                probability: bucket.probability * 100.0,
                ..bucket.clone()
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.buckets
            .iter()
            .find(|bucket| bucket.name == name)
            .map(|bucket| bucket.probability)
    }

    /// Number of combinations aggregated.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of combinations no rule could resolve.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
