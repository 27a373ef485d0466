use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::folders::models::{Folder, PathSegment};
use crate::folders::repository;
use crate::model::error::folder_errors::FolderError;
use crate::repository::SqlitePool;

/// Durable storage for folder trees. Owns the connection pool; every method checks out its own
/// connection and runs inside its own transaction, so no connection is ever held between calls
#[derive(Clone)]
pub struct TreeStore {
    pool: SqlitePool,
}

impl TreeStore {
    pub fn new(pool: SqlitePool) -> TreeStore {
        TreeStore { pool }
    }

    pub fn get(&self, folder_id: Uuid, user_id: &str) -> Result<Option<Folder>, FolderError> {
        self.read(|con| repository::get_by_id(folder_id, user_id, con))
    }

    pub fn children(
        &self,
        parent_id: Option<Uuid>,
        user_id: &str,
    ) -> Result<Vec<Folder>, FolderError> {
        self.read(|con| repository::get_child_folders(parent_id, user_id, con))
    }

    pub fn all_folders(&self, user_id: &str) -> Result<Vec<Folder>, FolderError> {
        self.read(|con| repository::get_all_folders(user_id, con))
    }

    pub fn ancestor_path(
        &self,
        folder_id: Uuid,
        user_id: &str,
    ) -> Result<Vec<PathSegment>, FolderError> {
        self.read(|con| repository::get_ancestor_path(folder_id, user_id, con))
    }

    pub fn is_descendant(
        &self,
        candidate_id: Uuid,
        ancestor_id: Uuid,
        user_id: &str,
    ) -> Result<bool, FolderError> {
        self.read(|con| repository::is_descendant(candidate_id, ancestor_id, user_id, con))
    }

    pub fn insert(
        &self,
        name: &str,
        parent_id: Option<Uuid>,
        user_id: &str,
    ) -> Result<Folder, FolderError> {
        self.atomically(|con| repository::create_folder(name, parent_id, user_id, con))
    }

    pub fn rename(&self, folder_id: Uuid, new_name: &str, user_id: &str) -> Result<Folder, FolderError> {
        self.atomically(|con| repository::rename_folder(folder_id, new_name, user_id, con))
    }

    pub fn reparent(
        &self,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
        user_id: &str,
    ) -> Result<Folder, FolderError> {
        self.atomically(|con| repository::reparent_folder(folder_id, new_parent_id, user_id, con))
    }

    pub fn soft_delete(&self, folder_id: Uuid, user_id: &str) -> Result<(), FolderError> {
        let deleted =
            self.atomically(|con| repository::soft_delete_folder(folder_id, user_id, con))?;
        log::debug!("soft deleted {deleted} folder(s) under {folder_id}");
        Ok(())
    }

    /// runs `f` inside a single `BEGIN IMMEDIATE` transaction. The write lock is taken before `f` runs,
    /// so everything `f` reads stays true until it commits. Any error rolls the transaction back
    pub fn atomically<T, F>(&self, f: F) -> Result<T, FolderError>
    where
        F: FnOnce(&Connection) -> Result<T, FolderError>,
    {
        let mut con = self.pool.get()?;
        let tx = con.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// runs `f` inside a deferred transaction so that multi-statement walks see one snapshot
    pub fn read<T, F>(&self, f: F) -> Result<T, FolderError>
    where
        F: FnOnce(&Connection) -> Result<T, FolderError>,
    {
        let mut con = self.pool.get()?;
        let tx = con.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}
