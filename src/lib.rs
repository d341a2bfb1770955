//! Coat color inheritance for kennel breeding plans.
//!
//! Two parents' genotypes are crossed locus by locus (a multi-locus Punnett
//! square), every resulting combination is run through an ordered,
//! epistasis-aware rule chain, and the phenotypes are bucketed into a
//! probability distribution. Pairwise results can be memoized through a
//! [`CompatibilityCache`] backed by any [`CacheStore`].
//!
//! ```
//! use kennel_genetics::prelude::*;
//!
//! # fn main() -> Result<(), GeneticsError> {
//! let group = TraitGroup::coat_color()?;
//! let sire = group.genotype("Duke", vec![("base", "Ee"), ("brown", "Bb"), ("dilute", "Dd")])?;
//! let dam = group.genotype("Daisy", vec![("base", "Ee"), ("brown", "bb"), ("dilute", "DD")])?;
//!
//! for bucket in group.predict(&sire, &dam)?.percentages() {
//!     println!("{} {:.1}% {}", bucket.name, bucket.probability, bucket.color);
//! }
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod cache;
pub mod compatibility;
pub mod config;
pub mod cross;
pub mod distribution;
pub mod error;
pub mod genetics;
pub mod observable;
pub mod phenotype;
pub mod trait_group;

pub use cache::{CacheStore, Cached, CompatibilityCache, MemoryStore, PairKey};
pub use compatibility::{assess, assess_cached, CompatibilityReport};
pub use cross::{Cross, CrossCombination};
pub use distribution::{Distribution, PhenotypeBucket};
pub use error::{CacheWarning, GeneticsError, Result, StoreError};
pub use genetics::{canonicalize, DogGenotype, Genotype, Locus};
pub use phenotype::{Phenotype, PhenotypeResolver, Rule};
pub use trait_group::TraitGroup;
