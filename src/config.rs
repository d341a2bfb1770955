use crate::error::Result;
use crate::genetics::Locus;
use crate::phenotype::{Effect, Matcher, Palette, PhenotypeResolver, Rule};
use crate::trait_group::TraitGroup;
use serde::{Deserialize, Serialize};

/// The built-in coat color group: base (E), brown (B) and dilute (D).
pub const COAT_COLOR: &str = r##"
name = "coat-color"

[[loci]]
name = "base"
alleles = "Ee"

[[loci]]
name = "brown"
alleles = "Bb"

[[loci]]
name = "dilute"
alleles = "Dd"

[[rules]]
locus = "base"
precedence = 10
matcher = "recessive"
effect = { assign = "Yellow" }

[[rules]]
locus = "brown"
precedence = 20
matcher = "dominant"
effect = { assign = "Black" }

[[rules]]
locus = "brown"
precedence = 20
matcher = "recessive"
effect = { assign = "Brown" }

[[rules]]
locus = "dilute"
precedence = 30
matcher = "recessive"
effect = { modify = { Black = "Grey", Brown = "Light Brown", Yellow = "Cream" } }

[palette]
fallback = "#999999"

[palette.colors]
Black = "#1a1a1a"
Brown = "#6b3e26"
Grey = "#8a8d91"
"Light Brown" = "#b58b65"
Yellow = "#e3b04b"
Cream = "#f3e5ab"
Unknown = "#cccccc"
"##;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocusConfig {
    pub name: String,
    /// Alleles listed from most to least dominant.
    pub alleles: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub locus: String,
    #[serde(default)]
    pub precedence: u32,
    pub matcher: Matcher,
    pub effect: Effect,
}

/// Declarative description of a trait group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitGroupConfig {
    pub name: String,
    pub loci: Vec<LocusConfig>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    pub palette: Palette,
}

impl TraitGroupConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Validates the description and compiles its rules.
    pub fn build(&self) -> Result<TraitGroup> {
        let loci = self
            .loci
            .iter()
            .map(|locus| Locus::with_precedence(&locus.name, &locus.alleles))
            .collect::<Result<Vec<_>>>()?;
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                Rule::new(
                    &loci,
                    &rule.locus,
                    rule.precedence,
                    &rule.matcher,
                    rule.effect.clone(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        TraitGroup::new(
            &self.name,
            loci,
            PhenotypeResolver::new(rules, self.palette.clone()),
        )
    }
}

impl TryFrom<TraitGroupConfig> for TraitGroup {
    type Error = crate::error::GeneticsError;

    fn try_from(config: TraitGroupConfig) -> Result<Self> {
        config.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneticsError;

    #[test]
    fn test_builtin_config_parses() -> Result<()> {
        let config = TraitGroupConfig::from_toml_str(COAT_COLOR)?;
        assert_eq!(config.loci.len(), 3);
        assert_eq!(config.rules.len(), 4);
        assert_eq!(config.palette.color("Light Brown"), "#b58b65");
        assert_eq!(config.palette.color("Merle"), "#999999");
        assert!(matches!(config.rules[3].effect, Effect::Modify(ref m) if m.len() == 3));
        Ok(())
    }

    #[test]
    fn test_rule_on_undeclared_locus_fails() {
        let source = r##"
            name = "broken"

            [[loci]]
            name = "base"
            alleles = "Ee"

            [[rules]]
            locus = "merle"
            matcher = "dominant"
            effect = { assign = "Merle" }

            [palette]
            fallback = "#000000"
        "##;
        let config = TraitGroupConfig::from_toml_str(source).unwrap();
        assert!(matches!(
            TraitGroup::try_from(config),
            Err(GeneticsError::UnknownLocus(ref l)) if l == "merle"
        ));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        assert!(matches!(
            TraitGroupConfig::from_toml_str("name = "),
            Err(GeneticsError::Config(_))
        ));
    }

    #[test]
    fn test_config_without_loci_is_rejected() {
        let config = TraitGroupConfig {
            name: "empty".into(),
            loci: vec![],
            rules: vec![],
            palette: Palette::new("#000000"),
        };
        assert!(matches!(
            config.build(),
            Err(GeneticsError::EmptyTraitGroup(_))
        ));
    }
}
