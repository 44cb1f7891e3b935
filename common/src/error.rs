use std::path::PathBuf;

use thiserror::Error;

/// A scalar value failed one of the shape checks in [`crate::validators`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid RFC1123 label '{0}'")]
    Label(String),
    #[error("invalid RFC1123 subdomain '{0}'")]
    Subdomain(String),
    #[error("invalid CIDR '{0}'")]
    Cidr(String),
    #[error("invalid integer '{0}'")]
    Integer(String),
    #[error("invalid {kind} '{value}'. Valid values are {}", .allowed.join(", "))]
    NotAllowed {
        kind: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("expected {expected} but got '{value}'")]
    Type {
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum ClusterApiError {
    #[error("invalid cluster api definition. Key '{path}' does not exist")]
    MissingKey { path: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("error parsing cluster api specification in `{}`: {cause}", .file.display())]
    Parse {
        file: PathBuf,
        cause: Box<ClusterApiError>,
    },
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cluster definition. {0}")]
    Consistency(String),
    #[error("invalid cluster api specification in {pattern}. {reason}")]
    Config { pattern: String, reason: String },
}

impl ClusterApiError {
    pub(crate) fn in_file(self, file: impl Into<PathBuf>) -> Self {
        ClusterApiError::Parse {
            file: file.into(),
            cause: Box::new(self),
        }
    }

    /// The error that caused this one, looking through per-file wrapping.
    pub fn root_cause(&self) -> &ClusterApiError {
        match self {
            ClusterApiError::Parse { cause, .. } => cause.root_cause(),
            e => e,
        }
    }
}

pub type Result<T, E = ClusterApiError> = std::result::Result<T, E>;
