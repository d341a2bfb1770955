use crate::cache::{Cached, CacheStore, CompatibilityCache, PairKey};
use crate::cross::locus_ratios;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::genetics::DogGenotype;
use crate::trait_group::TraitGroup;
use serde::{Deserialize, Serialize};

/// Odds that offspring inherit the recessive allele of one locus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocusRisk {
    pub locus: String,
    /// Two copies of the recessive allele.
    pub affected: f64,
    /// Exactly one copy.
    pub carrier: f64,
}

/// Everything known about pairing two animals for one trait group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub pair: PairKey,
    pub trait_group: String,
    pub phenotypes: Distribution,
    pub risks: Vec<LocusRisk>,
}

impl CompatibilityReport {
    /// The highest chance of an affected puppy across all loci.
    pub fn worst_risk(&self) -> Option<&LocusRisk> {
        self.risks
            .iter()
            .max_by(|a, b| a.affected.total_cmp(&b.affected))
    }
}

/// Computes the phenotype distribution and per-locus recessive risks of a pairing.
pub fn assess(group: &TraitGroup, sire: &DogGenotype, dam: &DogGenotype) -> Result<CompatibilityReport> {
    let phenotypes = group.predict(sire, dam)?;

    let mut risks = vec![];
    for locus in group.loci() {
        let recessive = locus.recessive();
        let ratios = locus_ratios(locus, sire.require(locus)?, dam.require(locus)?)?;
        let share = |copies: usize| -> f64 {
            ratios
                .iter()
                .filter(|(genotype, _)| {
                    genotype.alleles().iter().filter(|a| **a == recessive).count() == copies
                })
                .map(|(_, ratio)| ratio)
                .sum()
        };
        risks.push(LocusRisk {
            locus: locus.name().into(),
            affected: share(2),
            carrier: share(1),
        });
    }

    Ok(CompatibilityReport {
        pair: PairKey::new(sire.name(), dam.name()),
        trait_group: group.name().into(),
        phenotypes,
        risks,
    })
}

/// [`assess`] behind the compatibility cache, keyed by the trait group and
/// the animals' names.
pub async fn assess_cached<S: CacheStore>(
    cache: &CompatibilityCache<S>,
    group: &TraitGroup,
    sire: &DogGenotype,
    dam: &DogGenotype,
) -> Result<Cached<CompatibilityReport>> {
    let key = PairKey::scoped(group.name(), sire.name(), dam.name());
    cache
        .get_or_compute(&key, || async { assess(group, sire, dam) })
        .await
}
