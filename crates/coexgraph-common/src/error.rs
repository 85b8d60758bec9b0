use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoexError {
    #[error("Stringency must be at least {min}, got {value}")]
    InvalidStringency { value: u32, min: u32 },

    #[error("No genes selected")]
    NoGenesSelected,

    #[error("Too many genes selected: {requested} (max {max})")]
    TooManyGenes { requested: usize, max: usize },

    #[error("Query gene limit exceeded: {requested} requested, max {max} ({overflow} over)")]
    QueryGeneLimitExceeded {
        requested: usize,
        max: usize,
        overflow: usize,
    },

    #[error("All selected genes are already query genes")]
    NothingNewToExtend,

    #[error("Gene {0} has already been extended")]
    AlreadyQueryGene(i64),

    #[error("No graph has been loaded")]
    NoGraph,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search service error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export parse error on line {line}: {message}")]
    ExportParse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoexError>;

impl CoexError {
    /// True for the request-size violations a caller should surface as a
    /// "reduce your selection" prompt rather than a failure.
    pub fn is_size_violation(&self) -> bool {
        matches!(
            self,
            CoexError::NoGenesSelected
                | CoexError::TooManyGenes { .. }
                | CoexError::QueryGeneLimitExceeded { .. }
        )
    }
}
