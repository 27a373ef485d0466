use uuid::Uuid;

use crate::folders::models::{Breadcrumb, Folder, FolderContents, FolderDataResponse};
use crate::folders::repository;
use crate::folders::store::TreeStore;
use crate::model::error::folder_errors::FolderError;

/// longest a folder name may be, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// The user-facing folder use cases. Every method takes the already-resolved `user_id` of the caller,
/// and every structural read and write goes through the [`TreeStore`]
#[derive(Clone)]
pub struct FolderService {
    store: TreeStore,
}

impl FolderService {
    pub fn new(store: TreeStore) -> FolderService {
        FolderService { store }
    }

    pub fn create_folder(
        &self,
        user_id: &str,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, FolderError> {
        let name = validate_name(name)?;
        if let Some(parent_id) = parent_id {
            if self.store.get(parent_id, user_id)?.is_none() {
                return Err(FolderError::InvalidParent);
            }
        }
        let folder = self.store.insert(name, parent_id, user_id)?;
        log::info!("user {user_id} created folder {} ({name})", folder.id);
        Ok(folder)
    }

    pub fn rename_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        new_name: &str,
    ) -> Result<Folder, FolderError> {
        let new_name = validate_name(new_name)?;
        if self.store.get(folder_id, user_id)?.is_none() {
            return Err(FolderError::NotFound);
        }
        let folder = self.store.rename(folder_id, new_name, user_id)?;
        log::info!("user {user_id} renamed folder {folder_id} to {new_name}");
        Ok(folder)
    }

    /// moves `folder_id` under `new_parent_id`, or to the Dashboard when `new_parent_id` is `None`.
    ///
    /// The legality checks and the write share one immediate transaction, so a concurrent move can't
    /// reshape the tree between the cycle check and the update
    pub fn move_folder(
        &self,
        user_id: &str,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<Folder, FolderError> {
        let folder = self.store.atomically(|con| {
            if repository::get_by_id(folder_id, user_id, con)?.is_none() {
                return Err(FolderError::NotFound);
            }
            if let Some(parent_id) = new_parent_id {
                if repository::get_by_id(parent_id, user_id, con)?.is_none() {
                    return Err(FolderError::InvalidDestination);
                }
                if parent_id == folder_id
                    || repository::is_descendant(parent_id, folder_id, user_id, con)?
                {
                    return Err(FolderError::IllegalMove);
                }
                let height = repository::get_subtree_height(folder_id, user_id, con)?;
                repository::check_nesting_depth(parent_id, height, user_id, con)?;
            }
            repository::reparent_folder(folder_id, new_parent_id, user_id, con)
        })?;
        log::info!("user {user_id} moved folder {folder_id} under {new_parent_id:?}");
        Ok(folder)
    }

    /// soft deletes the folder along with everything beneath it
    pub fn delete_folder(&self, user_id: &str, folder_id: Uuid) -> Result<(), FolderError> {
        if self.store.get(folder_id, user_id)?.is_none() {
            return Err(FolderError::NotFound);
        }
        self.store.soft_delete(folder_id, user_id)?;
        log::info!("user {user_id} deleted folder {folder_id}");
        Ok(())
    }

    /// builds the view of a single folder, or of the user's Dashboard when `folder_id` is `None`
    pub fn get_folder_view(
        &self,
        user_id: &str,
        folder_id: Option<Uuid>,
    ) -> Result<FolderDataResponse, FolderError> {
        let mut breadcrumbs = vec![Breadcrumb::root()];
        let folder = match folder_id {
            Some(id) => {
                let folder = self.store.get(id, user_id)?.ok_or(FolderError::NotFound)?;
                let path = self.store.ancestor_path(id, user_id)?;
                breadcrumbs.extend(path.into_iter().map(Breadcrumb::from));
                Some(folder)
            }
            None => None,
        };
        let contents = FolderContents {
            folders: self.store.children(folder_id, user_id)?,
            // file management isn't implemented yet
            files: Vec::new(),
        };
        Ok(FolderDataResponse::new(folder, breadcrumbs, contents))
    }

    /// every live folder the user owns, ordered by name, for building a tree client-side
    pub fn get_all_folders(&self, user_id: &str) -> Result<Vec<Folder>, FolderError> {
        self.store.all_folders(user_id)
    }
}

/// trims `name` and makes sure it's between 1 and [`MAX_NAME_LENGTH`] characters
fn validate_name(name: &str) -> Result<&str, FolderError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolderError::Validation(
            "Folder name cannot be empty.".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(FolderError::Validation(format!(
            "Folder name must be at most {MAX_NAME_LENGTH} characters."
        )));
    }
    Ok(trimmed)
}
