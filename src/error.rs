use crate::parser::ParseErrors;

/// Errors returned by parsing and extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Some step of the path matched nothing
    #[error("\"{path}\" not found")]
    NotFound { path: String },

    /// The path matched, but only through a field the caller may not access
    #[error("\"{path}\" is not accessible")]
    AccessDenied { path: String },

    /// The path string is malformed
    #[error("invalid path:\n{0}")]
    Parse(#[from] ParseErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The rendered path of a failed extraction.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::NotFound { path } | Error::AccessDenied { path } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
