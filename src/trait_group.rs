use crate::config::{TraitGroupConfig, COAT_COLOR};
use crate::cross::{Cross, CrossCombination};
use crate::distribution::Distribution;
use crate::error::{GeneticsError, Result};
use crate::genetics::{DogGenotype, Locus};
use crate::phenotype::{Phenotype, PhenotypeResolver};
use log::{debug, warn};

/// Loci past which the `4^L` cross gets expensive enough to mention.
const LARGE_CROSS_LOCI: usize = 8;

/// Ordered loci resolved together into one phenotype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitGroup {
    name: String,
    loci: Vec<Locus>,
    resolver: PhenotypeResolver,
}

impl TraitGroup {
    pub fn new(name: &str, loci: Vec<Locus>, resolver: PhenotypeResolver) -> Result<Self> {
        if loci.is_empty() {
            return Err(GeneticsError::EmptyTraitGroup(name.into()));
        }
        for rule in resolver.rules() {
            rule.check_binding(&loci)?;
        }
        if loci.len() > LARGE_CROSS_LOCI {
            warn!(
                "Trait group {} spans {} loci; every cross enumerates 4^{} combinations",
                name,
                loci.len(),
                loci.len()
            );
        }
        Ok(Self {
            name: name.into(),
            loci,
            resolver,
        })
    }

    /// Base (E), brown (B) and dilute (D) coat color.
    pub fn coat_color() -> Result<Self> {
        TraitGroupConfig::from_toml_str(COAT_COLOR)?.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    pub fn locus(&self, name: &str) -> Option<&Locus> {
        self.loci.iter().find(|locus| locus.name() == name)
    }

    pub fn resolver(&self) -> &PhenotypeResolver {
        &self.resolver
    }

    /// Builds a genotype record for this group from `(locus, pair)` strings.
    pub fn genotype<'a, I>(&self, name: &str, pairs: I) -> Result<DogGenotype>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        DogGenotype::parse(name, &self.loci, pairs)
    }

    pub fn cross(&self, sire: &DogGenotype, dam: &DogGenotype) -> Result<Cross> {
        Cross::new(&self.loci, sire, dam)
    }

    pub fn resolve(&self, combination: &CrossCombination) -> Phenotype {
        self.resolver.resolve(combination)
    }

    /// Offspring phenotype distribution of `sire` x `dam`.
    pub fn predict(&self, sire: &DogGenotype, dam: &DogGenotype) -> Result<Distribution> {
        let cross = self.cross(sire, dam)?;
        let distribution =
            Distribution::aggregate(cross.map(|combination| self.resolve(&combination)));
        if distribution.unresolved() > 0 {
            warn!(
                "{} of {} combinations of {} x {} are not covered by trait group {}",
                distribution.unresolved(),
                distribution.total(),
                sire.name(),
                dam.name(),
                self.name
            );
        }
        debug!(
            "Predicted {} phenotypes for {} x {} in {}",
            distribution.buckets().len(),
            sire.name(),
            dam.name(),
            self.name
        );
        Ok(distribution)
    }
}
