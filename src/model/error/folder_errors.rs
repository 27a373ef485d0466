use std::backtrace::Backtrace;

use rusqlite::ffi;
use thiserror::Error;
use uuid::Uuid;

/// every failure a folder operation can produce. Each operation returns exactly one of these or a success value
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum FolderError {
    /// the request was malformed, such as an empty or oversized folder name, or it would nest folders too deep
    #[error("Invalid folder request: {0}")]
    Validation(String),
    /// the folder does not exist, belongs to someone else, or has been deleted
    #[error("The folder could not be found.")]
    NotFound,
    /// a live sibling under the same parent already has the requested name
    #[error("A folder with this name already exists in this location.")]
    DuplicateName,
    /// the requested parent folder does not exist or is not owned by the caller
    #[error("The specified parent folder does not exist.")]
    InvalidParent,
    /// the requested move destination does not exist or is not owned by the caller
    #[error("The destination folder does not exist.")]
    InvalidDestination,
    /// the user attempted to move a folder into itself or one of its descendants
    #[error("A folder cannot be moved into itself or one of its sub folders.")]
    IllegalMove,
    /// a traversal ran past its safety bounds; the stored tree has a cycle or a broken parent link
    #[error("The folder tree is corrupt near folder {0}")]
    CorruptTree(Uuid),
    /// the database or the connection pool failed
    #[error("Database failure: {0}")]
    DbFailure(String),
}

impl From<rusqlite::Error> for FolderError {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, _) = error {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE => return FolderError::DuplicateName,
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return FolderError::InvalidParent,
                _ => {}
            }
        }
        log::error!(
            "Folder query failed. Nested exception is {error:?}\n{}",
            Backtrace::force_capture()
        );
        FolderError::DbFailure(error.to_string())
    }
}

impl From<r2d2::Error> for FolderError {
    fn from(error: r2d2::Error) -> Self {
        log::error!("Failed to check out a database connection: {error}");
        FolderError::DbFailure(error.to_string())
    }
}
