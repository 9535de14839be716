use std::path::PathBuf;

/// Exit codes, BSD sysexits.h compatible.
pub mod exitcode {
    /// Command line usage error
    pub const USAGE: i32 = 64;
    /// Cannot open input
    pub const NOINPUT: i32 = 66;
    /// Service unavailable
    pub const UNAVAILABLE: i32 = 69;
    /// Remote error in protocol
    pub const PROTOCOL: i32 = 76;
    /// Permission denied
    pub const NOPERM: i32 = 77;
}

/// Everything that can go wrong between argv and the store.
///
/// One variant per failure class the user can tell apart; nothing is
/// retried, every variant ends the process with [`StoreError::exit_code`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid arguments: {0}")]
    Argument(String),
    #[error("cannot read descriptor file {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store rejected credentials: {0}")]
    Authorization(String),
    #[error("store request failed: {0}")]
    Http(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl StoreError {
    /// Stable machine-readable code for the `--json` error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Argument(_) => "ARGUMENT_ERROR",
            StoreError::FileAccess { .. } => "FILE_ACCESS_ERROR",
            StoreError::Authorization(_) => "AUTHORIZATION_ERROR",
            StoreError::Http(_) => "HTTP_ERROR",
            StoreError::Network(_) => "NETWORK_ERROR",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::Argument(_) => exitcode::USAGE,
            StoreError::FileAccess { .. } => exitcode::NOINPUT,
            StoreError::Authorization(_) => exitcode::NOPERM,
            StoreError::Http(_) => exitcode::PROTOCOL,
            StoreError::Network(_) => exitcode::UNAVAILABLE,
        }
    }
}
