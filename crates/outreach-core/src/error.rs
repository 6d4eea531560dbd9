use thiserror::Error;

/// Failures a command handler can hit. Every variant is converted into a
/// failure envelope at the service boundary; none escape to the transport.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Sheet \"{0}\" not found")]
    TableNotFound(String),

    #[error("Could not find \"{header}\" header in \"{table}\"")]
    HeaderNotFound { table: String, header: String },

    #[error("Could not find \"{column}\" column in \"{table}\"")]
    ColumnNotFound { table: String, column: String },

    #[error("{label} \"{key}\" not found in \"{table}\"")]
    RecordNotFound {
        table: String,
        label: String,
        key: String,
    },

    #[error("{0}")]
    MalformedCommand(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Slides creation failed: {0}")]
    Render(#[source] anyhow::Error),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl HubError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedCommand(msg.into())
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TableNotFound(_) => "table_not_found",
            Self::HeaderNotFound { .. } => "header_not_found",
            Self::ColumnNotFound { .. } => "column_not_found",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::MalformedCommand(_) => "malformed_command",
            Self::Configuration(_) => "configuration",
            Self::Render(_) => "render",
            Self::Store(_) => "store",
        }
    }
}

pub type Result<T, E = HubError> = std::result::Result<T, E>;
