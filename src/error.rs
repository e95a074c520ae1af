use thiserror::Error;

pub type Result<T> = std::result::Result<T, TinyDiError>;

#[derive(Debug, Error)]
pub enum TinyDiError {
    /// Neither an override nor a generated constructor exists for the type.
    #[error("No binding for {type_name}")]
    MissingBinding { type_name: String },

    #[error("Failed to downcast instance to {type_name}")]
    DowncastFailed { type_name: String },
}

impl TinyDiError {
    pub fn missing_binding(type_name: impl Into<String>) -> Self {
        Self::MissingBinding {
            type_name: type_name.into(),
        }
    }

    pub fn downcast_failed(type_name: impl Into<String>) -> Self {
        Self::DowncastFailed {
            type_name: type_name.into(),
        }
    }

    /// Name of the type the failing lookup was made for.
    pub fn type_name(&self) -> &str {
        match self {
            Self::MissingBinding { type_name } | Self::DowncastFailed { type_name } => type_name,
        }
    }
}
