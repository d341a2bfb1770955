pub use crate::cache::{CacheSource, CacheStore, Cached, CompatibilityCache, MemoryStore, PairKey};
pub use crate::compatibility::{assess, assess_cached, CompatibilityReport, LocusRisk};
pub use crate::config::TraitGroupConfig;
pub use crate::cross::{locus_ratios, punnett_square, Cross, CrossCombination};
pub use crate::distribution::{Distribution, PhenotypeBucket};
pub use crate::error::{CacheWarning, GeneticsError, StoreError};
pub use crate::genetics::{canonicalize, DogGenotype, Genotype, Locus};
pub use crate::observable::CsvBuilder;
pub use crate::phenotype::{Effect, Matcher, Palette, Phenotype, PhenotypeResolver, Rule, UNKNOWN};
pub use crate::trait_group::TraitGroup;
