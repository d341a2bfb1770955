use crate::cross::CrossCombination;
use crate::error::{GeneticsError, Result};
use crate::genetics::{Genotype, Locus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Label = String;

/// Label given to combinations no rule resolves.
pub const UNKNOWN: &str = "Unknown";

/// Which genotypes at a locus trigger a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// At least one copy of the locus's highest-precedence allele.
    Dominant,
    /// Two copies of the locus's lowest-precedence allele.
    Recessive,
    Homozygous,
    Heterozygous,
    /// One specific genotype, e.g. `"Ee"`.
    Exact(String),
}

/// What a matching rule does to the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Sets the label unless an earlier rule already set one.
    Assign(Label),
    /// Sets the label and ends resolution.
    Terminal(Label),
    /// Renames the label established so far.
    Modify(BTreeMap<Label, Label>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Carries(char),
    Double(char),
    Homozygous,
    Heterozygous,
    Exact(Genotype),
}

impl Condition {
    fn matches(&self, genotype: Genotype) -> bool {
        match self {
            Condition::Carries(allele) => genotype.contains(*allele),
            Condition::Double(allele) => genotype.alleles() == [*allele, *allele],
            Condition::Homozygous => genotype.is_homozygous(),
            Condition::Heterozygous => genotype.is_heterozygous(),
            Condition::Exact(exact) => genotype == *exact,
        }
    }
}

/// One step of the resolution chain, bound to a locus of its trait group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    locus: Locus,
    locus_index: usize,
    precedence: u32,
    condition: Condition,
    effect: Effect,
}

impl Rule {
    /// Compiles a rule against the ordered loci of a trait group.
    pub fn new(
        loci: &[Locus],
        locus: &str,
        precedence: u32,
        matcher: &Matcher,
        effect: Effect,
    ) -> Result<Self> {
        let (locus_index, target) = loci
            .iter()
            .enumerate()
            .find(|(_, l)| l.name() == locus)
            .ok_or_else(|| GeneticsError::UnknownLocus(locus.into()))?;

        let condition = match matcher {
            Matcher::Dominant => Condition::Carries(target.dominant()),
            Matcher::Recessive => Condition::Double(target.recessive()),
            Matcher::Homozygous => Condition::Homozygous,
            Matcher::Heterozygous => Condition::Heterozygous,
            Matcher::Exact(pair) => Condition::Exact(target.genotype(pair)?),
        };

        Ok(Self {
            locus: target.clone(),
            locus_index,
            precedence,
            condition,
            effect,
        })
    }

    pub fn locus(&self) -> &str {
        self.locus.name()
    }

    /// Checks that this rule was compiled against `loci` in this order.
    pub fn check_binding(&self, loci: &[Locus]) -> Result<()> {
        match loci.get(self.locus_index) {
            Some(bound) if *bound == self.locus => Ok(()),
            _ => Err(GeneticsError::RuleLocusMismatch {
                locus: self.locus.name().into(),
                index: self.locus_index,
            }),
        }
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.effect, Effect::Terminal(_))
    }

    /// Returns the label this rule establishes for `combination`, given the
    /// label established by the rules before it.
    pub fn evaluate(
        &self,
        combination: &CrossCombination,
        established: Option<&str>,
    ) -> Option<Label> {
        let genotype = combination.get(self.locus_index)?;
        if !self.condition.matches(genotype) {
            return None;
        }
        match &self.effect {
            Effect::Assign(label) if established.is_none() => Some(label.clone()),
            Effect::Assign(_) => None,
            Effect::Terminal(label) => Some(label.clone()),
            Effect::Modify(renames) => established.and_then(|l| renames.get(l)).cloned(),
        }
    }
}

/// Display colors for phenotype labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default)]
    colors: BTreeMap<Label, String>,
    fallback: String,
}

impl Palette {
    pub fn new(fallback: &str) -> Self {
        Self {
            colors: BTreeMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with(mut self, label: &str, color: &str) -> Self {
        self.colors.insert(label.into(), color.into());
        self
    }

    pub fn color(&self, label: &str) -> &str {
        self.colors
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// A resolved phenotype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phenotype {
    pub name: Label,
    pub color: String,
    /// False when no rule produced a label.
    pub resolved: bool,
}

/// Ordered, epistasis-aware rule chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeResolver {
    rules: Vec<Rule>,
    palette: Palette,
}

impl PhenotypeResolver {
    /// Rules run in ascending precedence; equal precedence keeps insertion order.
    pub fn new(mut rules: Vec<Rule>, palette: Palette) -> Self {
        rules.sort_by_key(Rule::precedence);
        Self { rules, palette }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn resolve(&self, combination: &CrossCombination) -> Phenotype {
        let mut label: Option<Label> = None;
        for rule in &self.rules {
            if let Some(next) = rule.evaluate(combination, label.as_deref()) {
                label = Some(next);
                if rule.is_terminal() {
                    break;
                }
            }
        }
        match label {
            Some(name) => Phenotype {
                color: self.palette.color(&name).into(),
                name,
                resolved: true,
            },
            None => Phenotype {
                name: UNKNOWN.into(),
                color: self.palette.color(UNKNOWN).into(),
                resolved: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loci() -> Vec<Locus> {
        vec![
            Locus::new("base", "Ee").unwrap(),
            Locus::new("brown", "Bb").unwrap(),
        ]
    }

    fn combination(base: &str, brown: &str) -> CrossCombination {
        let loci = loci();
        CrossCombination::new(vec![
            loci[0].genotype(base).unwrap(),
            loci[1].genotype(brown).unwrap(),
        ])
    }

    fn resolver(rules: Vec<Rule>) -> PhenotypeResolver {
        PhenotypeResolver::new(rules, Palette::new("#999999").with("Black", "#1a1a1a"))
    }

    #[test]
    fn test_matchers_follow_locus_precedence() -> Result<()> {
        let loci = loci();
        let dominant = Rule::new(&loci, "brown", 0, &Matcher::Dominant, Effect::Assign("B".into()))?;
        let recessive = Rule::new(&loci, "brown", 0, &Matcher::Recessive, Effect::Assign("b".into()))?;
        let exact = Rule::new(&loci, "brown", 0, &Matcher::Exact("bB".into()), Effect::Assign("het".into()))?;

        assert_eq!(dominant.evaluate(&combination("EE", "Bb"), None), Some("B".into()));
        assert_eq!(dominant.evaluate(&combination("EE", "bb"), None), None);
        assert_eq!(recessive.evaluate(&combination("EE", "bb"), None), Some("b".into()));
        assert_eq!(recessive.evaluate(&combination("EE", "BB"), None), None);
        assert_eq!(exact.evaluate(&combination("EE", "Bb"), None), Some("het".into()));
        Ok(())
    }

    #[test]
    fn test_rule_on_unknown_locus_is_rejected() {
        assert!(matches!(
            Rule::new(&loci(), "dilute", 0, &Matcher::Recessive, Effect::Assign("x".into())),
            Err(GeneticsError::UnknownLocus(_))
        ));
        assert!(matches!(
            Rule::new(&loci(), "base", 0, &Matcher::Exact("Ex".into()), Effect::Assign("x".into())),
            Err(GeneticsError::InvalidAllele { allele: 'x', .. })
        ));
    }

    #[test]
    fn test_binding_follows_locus_order() -> Result<()> {
        let loci = loci();
        let rule = Rule::new(&loci, "brown", 0, &Matcher::Recessive, Effect::Assign("Brown".into()))?;
        assert_eq!(rule.check_binding(&loci), Ok(()));

        let swapped = vec![loci[1].clone(), loci[0].clone()];
        assert!(matches!(
            rule.check_binding(&swapped),
            Err(GeneticsError::RuleLocusMismatch { index: 1, .. })
        ));
        let other_alphabet = vec![loci[0].clone(), Locus::with_precedence("brown", "bB")?];
        assert!(rule.check_binding(&other_alphabet).is_err());
        Ok(())
    }

    #[test]
    fn test_upstream_assignment_masks_downstream() -> Result<()> {
        let loci = loci();
        let resolver = resolver(vec![
            Rule::new(&loci, "base", 0, &Matcher::Recessive, Effect::Assign("Yellow".into()))?,
            Rule::new(&loci, "brown", 1, &Matcher::Dominant, Effect::Assign("Black".into()))?,
        ]);
        assert_eq!(resolver.resolve(&combination("ee", "BB")).name, "Yellow");
        let black = resolver.resolve(&combination("Ee", "BB"));
        assert_eq!(black.name, "Black");
        assert_eq!(black.color, "#1a1a1a");
        Ok(())
    }

    #[test]
    fn test_terminal_stops_the_chain() -> Result<()> {
        let loci = loci();
        let mut renames = BTreeMap::new();
        renames.insert("Yellow".to_string(), "Cream".to_string());
        let resolver = resolver(vec![
            Rule::new(&loci, "brown", 5, &Matcher::Recessive, Effect::Modify(renames))?,
            Rule::new(&loci, "base", 1, &Matcher::Recessive, Effect::Terminal("Yellow".into()))?,
        ]);
        assert_eq!(resolver.rules()[0].locus(), "base");
        assert_eq!(resolver.resolve(&combination("ee", "bb")).name, "Yellow");
        Ok(())
    }

    #[test]
    fn test_modify_renames_established_label() -> Result<()> {
        let loci = loci();
        let mut renames = BTreeMap::new();
        renames.insert("Black".to_string(), "Liver".to_string());
        let resolver = resolver(vec![
            Rule::new(&loci, "base", 0, &Matcher::Dominant, Effect::Assign("Black".into()))?,
            Rule::new(&loci, "brown", 1, &Matcher::Recessive, Effect::Modify(renames))?,
        ]);
        let liver = resolver.resolve(&combination("Ee", "bb"));
        assert_eq!(liver.name, "Liver");
        assert_eq!(liver.color, "#999999");
        Ok(())
    }

    #[test]
    fn test_gap_resolves_to_unknown() -> Result<()> {
        let loci = loci();
        let resolver = resolver(vec![Rule::new(
            &loci,
            "base",
            0,
            &Matcher::Dominant,
            Effect::Assign("Black".into()),
        )?]);
        let unknown = resolver.resolve(&combination("ee", "Bb"));
        assert_eq!(unknown.name, UNKNOWN);
        assert!(!unknown.resolved);
        assert_eq!(unknown.color, "#999999");
        Ok(())
    }

    #[test]
    fn test_resolution_is_deterministic() -> Result<()> {
        let loci = loci();
        let resolver = resolver(vec![
            Rule::new(&loci, "base", 0, &Matcher::Heterozygous, Effect::Assign("Carrier".into()))?,
            Rule::new(&loci, "base", 0, &Matcher::Homozygous, Effect::Assign("Clear".into()))?,
        ]);
        let combo = combination("eE", "bb");
        assert_eq!(resolver.resolve(&combo), resolver.resolve(&combo));
        assert_eq!(resolver.resolve(&combo).name, "Carrier");
        Ok(())
    }
}
