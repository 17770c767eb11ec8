use resolver::{HostNameError, ResolveError};
use std::io;
use thiserror::Error;

/// Everything that can end a `hostlookup` run unsuccessfully.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] config::LoadError),

    #[error("host {host:?} from config is invalid: {source}")]
    ConfigHost {
        host: String,
        #[source]
        source: HostNameError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
