use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeneticsError>;

/// Errors raised while building genotypes or trait groups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticsError {
    #[error("Malformed genotype '{genotype}' at locus {locus}: expected 2 alleles, got {len}")]
    WrongLength {
        locus: String,
        genotype: String,
        len: usize,
    },

    #[error("Allele '{allele}' is not part of locus {locus} (alphabet '{alphabet}')")]
    InvalidAllele {
        locus: String,
        allele: char,
        alphabet: String,
    },

    #[error("Unknown locus: {0}")]
    UnknownLocus(String),

    #[error("Missing genotype for locus {locus} on {animal}")]
    MissingLocus { animal: String, locus: String },

    #[error("Locus {locus} lists allele '{allele}' more than once")]
    DuplicateAllele { locus: String, allele: char },

    #[error("Locus {0} has an empty allele alphabet")]
    EmptyAlphabet(String),

    #[error("Trait group {0} has no loci")]
    EmptyTraitGroup(String),

    #[error("Rule for locus {locus} is bound to position {index}, which holds a different locus")]
    RuleLocusMismatch { locus: String, index: usize },

    #[error("Malformed cell '{cell}' in column {locus}: expected two alleles around the separator")]
    MalformedCell { locus: String, cell: String },

    #[error("Cross over {0} loci exceeds the enumerable combination space")]
    TooManyLoci(usize),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error on record {record}: {message}")]
    Csv { record: usize, message: String },

    #[error("Record {record}: {source}")]
    Record {
        record: usize,
        source: Box<GeneticsError>,
    },
}

impl From<toml::de::Error> for GeneticsError {
    fn from(err: toml::de::Error) -> Self {
        GeneticsError::Config(err.to_string())
    }
}

impl From<csv::Error> for GeneticsError {
    fn from(err: csv::Error) -> Self {
        let record = err
            .position()
            .map(|pos| pos.record() as usize)
            .unwrap_or_default();
        GeneticsError::Csv {
            record,
            message: err.to_string(),
        }
    }
}

/// Failures of the persisted compatibility store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Payload serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Non-fatal problems met while serving a cached computation.
///
/// The value returned alongside a warning is always freshly computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheWarning {
    #[error("Cache read failed: {0}")]
    Read(StoreError),

    #[error("Cached payload could not be decoded: {0}")]
    Decode(StoreError),

    #[error("Cache write failed: {0}")]
    Write(StoreError),
}
