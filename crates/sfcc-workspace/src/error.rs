use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace walk was rejected; the refresh fails and the previous
    /// tree stays published.
    #[error("workspace discovery failed")]
    Discovery(#[source] walkdir::Error),

    #[error(transparent)]
    Cache(#[from] sfcc_cache::CacheError),

    #[error("file watcher error")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
