use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Required column '{name}' not found in dataset")]
    MissingColumn { name: String },

    #[error("Dataset has no header row")]
    EmptyHeader,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
