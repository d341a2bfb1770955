use crate::error::{GeneticsError, Result};
use crate::genetics::{DogGenotype, Genotype, Locus};
use log::debug;
use ndarray::Array2;
use std::collections::BTreeMap;

/// Pairings contributed by one locus: one sire allele times one dam allele.
pub const PAIRINGS_PER_LOCUS: usize = 4;

/// Builds the 2x2 Punnett square of one locus.
///
/// Rows are the sire's alleles, columns the dam's. Homozygous parents still
/// fill every cell, so identical genotypes are counted once per cell.
pub fn punnett_square(locus: &Locus, sire: Genotype, dam: Genotype) -> Result<Array2<Genotype>> {
    let rank = |allele: char| locus.rank(allele).map(|r| (allele, r));
    let [s0, s1] = sire.alleles();
    let [d0, d1] = dam.alleles();
    let sire = [rank(s0)?, rank(s1)?];
    let dam = [rank(d0)?, rank(d1)?];
    Ok(Array2::from_shape_fn((2, 2), |(i, j)| {
        Locus::ordered(sire[i], dam[j])
    }))
}

/// Fraction of offspring carrying each genotype at a single locus.
pub fn locus_ratios(
    locus: &Locus,
    sire: Genotype,
    dam: Genotype,
) -> Result<BTreeMap<Genotype, f64>> {
    let square = punnett_square(locus, sire, dam)?;
    let total = square.len() as f64;
    let mut ratios = BTreeMap::new();
    for genotype in square.iter() {
        *ratios.entry(*genotype).or_insert(0.0) += 1.0 / total;
    }
    Ok(ratios)
}

/// One outcome of independent segregation, one genotype per locus.
///
/// Genotypes are stored in the locus order of the cross that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrossCombination {
    genotypes: Vec<Genotype>,
}

impl CrossCombination {
    pub fn new(genotypes: Vec<Genotype>) -> Self {
        Self { genotypes }
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    pub fn get(&self, locus_index: usize) -> Option<Genotype> {
        self.genotypes.get(locus_index).copied()
    }
}

/// Lazy enumeration of every sire/dam pairing across a set of loci.
///
/// Yields `4^L` combinations for `L` loci. The only state is a cursor, so a
/// fresh `Cross::new` over the same parents replays the same sequence.
#[derive(Debug, Clone)]
pub struct Cross {
    squares: Vec<Array2<Genotype>>,
    cursor: usize,
    total: usize,
}

impl Cross {
    pub fn new(loci: &[Locus], sire: &DogGenotype, dam: &DogGenotype) -> Result<Self> {
        let total = u32::try_from(loci.len())
            .ok()
            .and_then(|n| PAIRINGS_PER_LOCUS.checked_pow(n))
            .ok_or(GeneticsError::TooManyLoci(loci.len()))?;

        let squares = loci
            .iter()
            .map(|locus| punnett_square(locus, sire.require(locus)?, dam.require(locus)?))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Crossing {} x {} over {} loci ({} combinations)",
            sire.name(),
            dam.name(),
            loci.len(),
            total
        );

        Ok(Self {
            squares,
            cursor: 0,
            total,
        })
    }

    /// Total number of combinations, consumed or not.
    pub fn total(&self) -> usize {
        self.total
    }

    fn combination(&self, index: usize) -> CrossCombination {
        let mut rest = index;
        let mut genotypes = vec![];
        for square in self.squares.iter().rev() {
            let cell = rest % PAIRINGS_PER_LOCUS;
            rest /= PAIRINGS_PER_LOCUS;
            genotypes.push(square[[cell / 2, cell % 2]]);
        }
        genotypes.reverse();
        CrossCombination::new(genotypes)
    }
}

impl Iterator for Cross {
    type Item = CrossCombination;

    fn next(&mut self) -> Option<CrossCombination> {
        if self.cursor >= self.total {
            return None;
        }
        let combination = self.combination(self.cursor);
        self.cursor += 1;
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cross {}
