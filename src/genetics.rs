use crate::error::{GeneticsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Orders two alleles without reference to a locus.
///
/// Uppercase (dominant) alleles sort before lowercase ones, alleles of the
/// same case sort by character code.
fn case_order(a: char, b: char) -> std::cmp::Ordering {
    (a.is_lowercase(), a).cmp(&(b.is_lowercase(), b))
}

/// Returns the canonical form of a 2-character allele pair.
///
/// ```
/// use kennel_genetics::canonicalize;
/// assert_eq!(canonicalize("eE").unwrap(), "Ee");
/// assert_eq!(canonicalize("Ee").unwrap(), "Ee");
/// ```
pub fn canonicalize(pair: &str) -> Result<String> {
    let genotype = Genotype::from_pair_str(pair)?;
    Ok(genotype.to_string())
}

/// A genetic position with an ordered allele alphabet.
///
/// The order of the alphabet is the dominance precedence: the first allele
/// masks every allele after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locus {
    name: String,
    alleles: Vec<char>,
}

impl Locus {
    /// Builds a locus whose precedence follows case: uppercase alleles first,
    /// ties broken by character code.
    pub fn new(name: &str, alphabet: &str) -> Result<Self> {
        let mut alleles: Vec<char> = alphabet.chars().collect();
        alleles.sort_by(|a, b| case_order(*a, *b));
        Self::build(name, alleles)
    }

    /// Builds a locus whose precedence is exactly the order of `alphabet`.
    pub fn with_precedence(name: &str, alphabet: &str) -> Result<Self> {
        Self::build(name, alphabet.chars().collect())
    }

    fn build(name: &str, alleles: Vec<char>) -> Result<Self> {
        if alleles.is_empty() {
            return Err(GeneticsError::EmptyAlphabet(name.into()));
        }
        for (i, allele) in alleles.iter().enumerate() {
            if alleles[..i].contains(allele) {
                return Err(GeneticsError::DuplicateAllele {
                    locus: name.into(),
                    allele: *allele,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            alleles,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alleles in precedence order.
    pub fn alleles(&self) -> &[char] {
        &self.alleles
    }

    /// The highest-precedence allele.
    pub fn dominant(&self) -> char {
        self.alleles[0]
    }

    /// The lowest-precedence allele.
    pub fn recessive(&self) -> char {
        self.alleles[self.alleles.len() - 1]
    }

    /// Position of `allele` in the precedence order.
    pub fn rank(&self, allele: char) -> Result<usize> {
        self.alleles
            .iter()
            .position(|a| *a == allele)
            .ok_or_else(|| GeneticsError::InvalidAllele {
                locus: self.name.clone(),
                allele,
                alphabet: self.alleles.iter().collect(),
            })
    }

    /// Parses and canonicalizes a genotype string for this locus.
    pub fn genotype(&self, pair: &str) -> Result<Genotype> {
        let chars: Vec<char> = pair.chars().collect();
        if chars.len() != 2 {
            return Err(GeneticsError::WrongLength {
                locus: self.name.clone(),
                genotype: pair.into(),
                len: chars.len(),
            });
        }
        self.pair(chars[0], chars[1])
    }

    /// Combines two alleles into a canonical genotype for this locus.
    pub fn pair(&self, a: char, b: char) -> Result<Genotype> {
        Ok(Self::ordered((a, self.rank(a)?), (b, self.rank(b)?)))
    }

    /// Orders two alleles whose ranks are already known.
    pub(crate) fn ordered(a: (char, usize), b: (char, usize)) -> Genotype {
        if a.1 <= b.1 {
            Genotype([a.0, b.0])
        } else {
            Genotype([b.0, a.0])
        }
    }

    /// Checks that `genotype` only carries alleles of this locus and returns
    /// it in this locus's canonical order.
    pub fn check(&self, genotype: Genotype) -> Result<Genotype> {
        self.pair(genotype.0[0], genotype.0[1])
    }
}

/// A canonical diploid allele pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Genotype([char; 2]);

impl Genotype {
    /// Parses a pair using case dominance, without a locus alphabet.
    pub fn from_pair_str(pair: &str) -> Result<Self> {
        let [a, b] = Self::letters(pair)?;
        if case_order(a, b).is_le() {
            Ok(Genotype([a, b]))
        } else {
            Ok(Genotype([b, a]))
        }
    }

    /// Reads a pair already in its locus order, as written by `Display`.
    /// `DogGenotype::require` re-checks it against the locus.
    pub fn from_stored(pair: &str) -> Result<Self> {
        Self::letters(pair).map(Genotype)
    }

    fn letters(pair: &str) -> Result<[char; 2]> {
        let chars: Vec<char> = pair.chars().collect();
        match chars.as_slice() {
            [a, b] if a.is_alphabetic() && b.is_alphabetic() => Ok([*a, *b]),
            [a, b] => {
                let bad = if a.is_alphabetic() { *b } else { *a };
                Err(GeneticsError::InvalidAllele {
                    locus: "?".into(),
                    allele: bad,
                    alphabet: "A-Za-z".into(),
                })
            }
            _ => Err(GeneticsError::WrongLength {
                locus: "?".into(),
                genotype: pair.into(),
                len: chars.len(),
            }),
        }
    }

    pub fn alleles(&self) -> [char; 2] {
        self.0
    }

    pub fn is_homozygous(&self) -> bool {
        self.0[0] == self.0[1]
    }

    pub fn is_heterozygous(&self) -> bool {
        !self.is_homozygous()
    }

    pub fn contains(&self, allele: char) -> bool {
        self.0.contains(&allele)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0], self.0[1])
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> String {
        genotype.to_string()
    }
}

impl TryFrom<String> for Genotype {
    type Error = GeneticsError;

    fn try_from(pair: String) -> Result<Self> {
        Genotype::from_stored(&pair)
    }
}

/// All recorded genotypes of one animal, keyed by locus name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogGenotype {
    name: String,
    loci: BTreeMap<String, Genotype>,
}

impl DogGenotype {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            loci: BTreeMap::new(),
        }
    }

    /// Builds a genotype record from `(locus, pair)` strings, validating
    /// each pair against its locus.
    pub fn parse<'a, I>(name: &str, loci: &[Locus], pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut dog = Self::new(name);
        for (locus_name, pair) in pairs {
            let locus = loci
                .iter()
                .find(|l| l.name() == locus_name)
                .ok_or_else(|| GeneticsError::UnknownLocus(locus_name.into()))?;
            dog.record(locus, pair)?;
        }
        Ok(dog)
    }

    /// Records a test result at `locus`, replacing any previous one.
    pub fn record(&mut self, locus: &Locus, pair: &str) -> Result<&mut Self> {
        let genotype = locus.genotype(pair)?;
        self.loci.insert(locus.name().into(), genotype);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, locus: &str) -> Option<Genotype> {
        self.loci.get(locus).copied()
    }

    /// The genotype at `locus`, validated against its alphabet.
    pub fn require(&self, locus: &Locus) -> Result<Genotype> {
        let genotype = self
            .get(locus.name())
            .ok_or_else(|| GeneticsError::MissingLocus {
                animal: self.name.clone(),
                locus: locus.name().into(),
            })?;
        locus.check(genotype)
    }

    pub fn loci(&self) -> impl Iterator<Item = (&str, Genotype)> {
        self.loci.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_canonical_order_is_input_insensitive() -> Result<()> {
        assert_eq!(canonicalize("eE")?, canonicalize("Ee")?);
        assert_eq!(canonicalize("eE")?, "Ee");
        assert_eq!(canonicalize("ba")?, "ab");
        assert_eq!(canonicalize("BA")?, "AB");
        Ok(())
    }

    #[test]
    fn test_malformed_pairs_are_rejected() {
        assert!(matches!(
            canonicalize("E"),
            Err(GeneticsError::WrongLength { len: 1, .. })
        ));
        assert!(matches!(
            canonicalize("Eee"),
            Err(GeneticsError::WrongLength { len: 3, .. })
        ));
        assert!(matches!(
            canonicalize("E1"),
            Err(GeneticsError::InvalidAllele { allele: '1', .. })
        ));
    }

    #[test]
    fn test_locus_rejects_foreign_alleles() -> Result<()> {
        let locus = Locus::new("brown", "bB")?;
        assert_eq!(locus.alleles(), &['B', 'b']);
        assert_eq!(locus.genotype("bB")?.to_string(), "Bb");
        assert!(matches!(
            locus.genotype("Bd"),
            Err(GeneticsError::InvalidAllele { allele: 'd', .. })
        ));
        assert!(matches!(
            locus.genotype(""),
            Err(GeneticsError::WrongLength { len: 0, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_explicit_precedence_overrides_case() -> Result<()> {
        let locus = Locus::with_precedence("agouti", "ayt")?;
        assert_eq!(locus.genotype("ta")?.to_string(), "at");
        assert_eq!(locus.dominant(), 'a');
        assert_eq!(locus.recessive(), 't');
        Ok(())
    }

    #[test]
    fn test_duplicate_alleles_are_rejected() {
        assert!(matches!(
            Locus::new("base", "EeE"),
            Err(GeneticsError::DuplicateAllele { allele: 'E', .. })
        ));
        assert!(matches!(
            Locus::new("base", ""),
            Err(GeneticsError::EmptyAlphabet(_))
        ));
    }

    #[test]
    fn test_dog_genotype_requires_every_locus() -> Result<()> {
        let base = Locus::new("base", "Ee")?;
        let brown = Locus::new("brown", "Bb")?;
        let loci = vec![base.clone(), brown.clone()];
        let dog = DogGenotype::parse("Rex", &loci, vec![("base", "eE")])?;
        assert_eq!(dog.require(&base)?.to_string(), "Ee");
        assert!(matches!(
            dog.require(&brown),
            Err(GeneticsError::MissingLocus { .. })
        ));
        assert!(matches!(
            DogGenotype::parse("Rex", &loci, vec![("dilute", "Dd")]),
            Err(GeneticsError::UnknownLocus(_))
        ));
        Ok(())
    }

    #[test]
    fn test_genotype_serializes_as_string() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let base = Locus::new("base", "Ee")?;
        let mut dog = DogGenotype::new("Bella");
        dog.record(&base, "eE")?;
        let json = serde_json::to_string(&dog)?;
        assert_eq!(json, r#"{"name":"Bella","loci":{"base":"Ee"}}"#);
        let back: DogGenotype = serde_json::from_str(&json)?;
        assert_eq!(back, dog);
        Ok(())
    }

    #[test]
    fn test_stored_genotype_keeps_locus_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let agouti = Locus::with_precedence("agouti", "tya")?;
        let mut dog = DogGenotype::new("Pepper");
        dog.record(&agouti, "at")?;
        let json = serde_json::to_string(&dog)?;
        assert_eq!(json, r#"{"name":"Pepper","loci":{"agouti":"ta"}}"#);

        let back: DogGenotype = serde_json::from_str(&json)?;
        assert_eq!(back, dog);
        assert_eq!(back.require(&agouti)?, agouti.genotype("ta")?);
        assert!(serde_json::from_str::<Genotype>(r#""t1""#).is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(a in "[a-zA-Z]", b in "[a-zA-Z]") {
            let pair = format!("{}{}", a, b);
            let once = canonicalize(&pair).unwrap();
            let twice = canonicalize(&once).unwrap();
            prop_assert_eq!(&once, &twice);
            let swapped = format!("{}{}", b, a);
            prop_assert_eq!(once, canonicalize(&swapped).unwrap());
        }
    }
}
