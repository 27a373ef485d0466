use std::fs::remove_file;
use std::path::Path;

use rusqlite::params;
use uuid::Uuid;

use crate::folders::models::Folder;
use crate::folders::service::FolderService;
use crate::folders::store::TreeStore;
use crate::repository::{initialize_db, open_pool, SqlitePool};

/// the user most tests act as
pub static USER: &str = "user_a";
/// someone who must never see `USER`'s folders
pub static OTHER_USER: &str = "user_b";

/// removes any leftover database for this thread and returns a pool over a freshly initialized one
pub fn refresh_db() -> SqlitePool {
    cleanup();
    let pool = open_pool().unwrap();
    initialize_db(&pool).unwrap();
    pool
}

pub fn test_store() -> TreeStore {
    TreeStore::new(refresh_db())
}

pub fn test_service() -> FolderService {
    FolderService::new(test_store())
}

/// creates a folder for `user_id`, bypassing all validation in the service layer
pub fn create_folder_db_entry(
    store: &TreeStore,
    name: &str,
    parent_id: Option<Uuid>,
    user_id: &str,
) -> Folder {
    store.insert(name, parent_id, user_id).unwrap()
}

/// builds a straight line of `len` nested folders under `parent_id`, named `{prefix}{level}`, outermost first
pub fn create_chain(
    store: &TreeStore,
    prefix: &str,
    len: usize,
    parent_id: Option<Uuid>,
) -> Vec<Folder> {
    let mut chain: Vec<Folder> = Vec::with_capacity(len);
    let mut parent_id = parent_id;
    for level in 0..len {
        let folder = create_folder_db_entry(store, &format!("{prefix}{level}"), parent_id, USER);
        parent_id = Some(folder.id);
        chain.push(folder);
    }
    chain
}

/// points `id` straight at `parent_id` with no checks at all, for building corrupt trees
pub fn force_parent(store: &TreeStore, id: Uuid, parent_id: Option<Uuid>) {
    store
        .atomically(|con| {
            con.execute(
                "update Folders set parentId = ?1 where id = ?2",
                params![parent_id, id],
            )?;
            Ok(())
        })
        .unwrap();
}

pub fn current_thread_name() -> String {
    let current_thread = std::thread::current();
    current_thread.name().unwrap().to_string()
}

pub fn cleanup() {
    let thread_name = current_thread_name();
    for suffix in ["sqlite", "sqlite-wal", "sqlite-shm"] {
        remove_file(Path::new(format!("{thread_name}.{suffix}").as_str())).unwrap_or(());
    }
}
