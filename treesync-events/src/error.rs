use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the inotify event source.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("cannot create inotify instance: {0}")]
    Init(#[source] std::io::Error),

    #[error("cannot watch [{path}]: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading inotify records: {0}")]
    Read(#[source] std::io::Error),

    #[error("polling inotify fd: {0}")]
    Poll(#[source] std::io::Error),
}
