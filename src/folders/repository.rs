use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::folders::models::{Folder, PathSegment};
use crate::model::error::folder_errors::FolderError;

/// deepest a parent chain may go before we assume it loops
pub const MAX_TREE_DEPTH: usize = 1000;
/// most folders a single subtree walk may visit
pub const MAX_SUBTREE_FOLDERS: usize = 100_000;

/// retrieves the live folder with the passed id if `user_id` owns it.
///
/// `Ok(None)` means the folder doesn't exist, is owned by someone else, or was deleted
pub fn get_by_id(id: Uuid, user_id: &str, con: &Connection) -> Result<Option<Folder>, FolderError> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/get_folder_by_id.sql"))?;
    Ok(pst.query_row(params![id, user_id], map_folder).optional()?)
}

/// returns the live children of `parent_id`, or of the user's root when `parent_id` is `None`, ordered by name
pub fn get_child_folders(
    parent_id: Option<Uuid>,
    user_id: &str,
    con: &Connection,
) -> Result<Vec<Folder>, FolderError> {
    let folders = match parent_id {
        Some(parent_id) => {
            let mut pst = con.prepare(include_str!(
                "../assets/queries/folder/get_child_folders_with_id.sql"
            ))?;
            let rows = pst.query_map(params![user_id, parent_id], map_folder)?;
            rows.collect::<Result<Vec<Folder>, rusqlite::Error>>()?
        }
        None => {
            let mut pst = con.prepare(include_str!(
                "../assets/queries/folder/get_child_folders_without_id.sql"
            ))?;
            let rows = pst.query_map(params![user_id], map_folder)?;
            rows.collect::<Result<Vec<Folder>, rusqlite::Error>>()?
        }
    };
    Ok(folders)
}

/// flat list of every live folder the user owns, ordered by name. No structural checks are done here
pub fn get_all_folders(user_id: &str, con: &Connection) -> Result<Vec<Folder>, FolderError> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/get_all_folders.sql"))?;
    let rows = pst.query_map(params![user_id], map_folder)?;
    Ok(rows.collect::<Result<Vec<Folder>, rusqlite::Error>>()?)
}

/// walks up the parent chain of `id` and returns every folder on it, root first and `id` last.
///
/// Fails with [`FolderError::NotFound`] if `id` isn't a live folder of `user_id`, and with
/// [`FolderError::CorruptTree`] if the chain loops, runs deeper than [`MAX_TREE_DEPTH`], or
/// points at a parent that isn't a live folder of the same user
pub fn get_ancestor_path(
    id: Uuid,
    user_id: &str,
    con: &Connection,
) -> Result<Vec<PathSegment>, FolderError> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/get_parent_link.sql"))?;
    let mut lookup = |folder_id: Uuid| {
        pst.query_row(params![folder_id, user_id], |row| {
            Ok((
                PathSegment {
                    id: row.get(0)?,
                    name: row.get(1)?,
                },
                row.get::<_, Option<Uuid>>(2)?,
            ))
        })
        .optional()
    };
    let (segment, mut parent_id) = lookup(id)?.ok_or(FolderError::NotFound)?;
    let mut seen = HashSet::from([segment.id]);
    let mut path = vec![segment];
    while let Some(current) = parent_id {
        if path.len() >= MAX_TREE_DEPTH || !seen.insert(current) {
            return Err(corrupt_tree(current, "parent chain loops or is too deep"));
        }
        let Some((segment, next)) = lookup(current)? else {
            // a live folder must never point at a missing, deleted, or foreign parent
            return Err(corrupt_tree(current, "parent is not a live folder of this user"));
        };
        path.push(segment);
        parent_id = next;
    }
    path.reverse();
    Ok(path)
}

/// checks if `candidate_id` is `ancestor_id` itself or anywhere beneath it
pub fn is_descendant(
    candidate_id: Uuid,
    ancestor_id: Uuid,
    user_id: &str,
    con: &Connection,
) -> Result<bool, FolderError> {
    if candidate_id == ancestor_id {
        return Ok(true);
    }
    let walk = walk_subtree(ancestor_id, user_id, Some(candidate_id), con)?;
    Ok(walk.found)
}

/// returns the ids of `root_id` and every live folder beneath it, breadth-first
pub fn get_subtree_ids(root_id: Uuid, user_id: &str, con: &Connection) -> Result<Vec<Uuid>, FolderError> {
    Ok(walk_subtree(root_id, user_id, None, con)?.visited)
}

/// number of levels in the subtree rooted at `root_id`, counting `root_id` itself
pub fn get_subtree_height(root_id: Uuid, user_id: &str, con: &Connection) -> Result<usize, FolderError> {
    Ok(walk_subtree(root_id, user_id, None, con)?.height)
}

/// fails with [`FolderError::Validation`] if hanging a subtree `height` levels tall under `parent_id`
/// would nest folders deeper than [`MAX_TREE_DEPTH`]
pub fn check_nesting_depth(
    parent_id: Uuid,
    height: usize,
    user_id: &str,
    con: &Connection,
) -> Result<(), FolderError> {
    let parent_depth = get_ancestor_path(parent_id, user_id, con)?.len();
    if parent_depth + height > MAX_TREE_DEPTH {
        return Err(FolderError::Validation(format!(
            "Folders cannot be nested more than {MAX_TREE_DEPTH} levels deep."
        )));
    }
    Ok(())
}

/// creates a folder record in the database.
///
/// The parent is checked here so that the check and the insert share the caller's transaction.
/// Sibling name collisions are caught by the unique index and surface as [`FolderError::DuplicateName`]
pub fn create_folder(
    name: &str,
    parent_id: Option<Uuid>,
    user_id: &str,
    con: &Connection,
) -> Result<Folder, FolderError> {
    if let Some(parent_id) = parent_id {
        if get_by_id(parent_id, user_id, con)?.is_none() {
            return Err(FolderError::InvalidParent);
        }
        check_nesting_depth(parent_id, 1, user_id, con)?;
    }
    let now = Utc::now();
    let folder = Folder {
        id: Uuid::new_v4(),
        name: name.to_string(),
        parent_id,
        user_id: user_id.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    let mut pst = con.prepare(include_str!("../assets/queries/folder/create_folder.sql"))?;
    pst.execute(params![
        folder.id,
        folder.name,
        folder.parent_id,
        folder.user_id,
        now
    ])?;
    Ok(folder)
}

pub fn rename_folder(
    id: Uuid,
    new_name: &str,
    user_id: &str,
    con: &Connection,
) -> Result<Folder, FolderError> {
    let mut pst = con.prepare(include_str!("../assets/queries/folder/rename_folder.sql"))?;
    let updated = pst.execute(params![new_name, Utc::now(), id, user_id])?;
    if updated == 0 {
        return Err(FolderError::NotFound);
    }
    get_by_id(id, user_id, con)?.ok_or(FolderError::NotFound)
}

/// points `id` at a new parent. Only the destination's existence and ownership are checked here;
/// making sure the move can't create a cycle is up to the caller
pub fn reparent_folder(
    id: Uuid,
    new_parent_id: Option<Uuid>,
    user_id: &str,
    con: &Connection,
) -> Result<Folder, FolderError> {
    if let Some(parent_id) = new_parent_id {
        if get_by_id(parent_id, user_id, con)?.is_none() {
            return Err(FolderError::InvalidParent);
        }
    }
    let mut pst = con.prepare(include_str!("../assets/queries/folder/reparent_folder.sql"))?;
    let updated = pst.execute(params![new_parent_id, Utc::now(), id, user_id])?;
    if updated == 0 {
        return Err(FolderError::NotFound);
    }
    get_by_id(id, user_id, con)?.ok_or(FolderError::NotFound)
}

/// marks `id` and every live folder beneath it as deleted with the same timestamp.
/// Returns how many folders were deleted
pub fn soft_delete_folder(id: Uuid, user_id: &str, con: &Connection) -> Result<usize, FolderError> {
    if get_by_id(id, user_id, con)?.is_none() {
        return Err(FolderError::NotFound);
    }
    let subtree = get_subtree_ids(id, user_id, con)?;
    let now = Utc::now();
    let mut pst = con.prepare(include_str!(
        "../assets/queries/folder/soft_delete_folder.sql"
    ))?;
    let mut deleted = 0;
    for folder_id in subtree {
        deleted += pst.execute(params![now, folder_id, user_id])?;
    }
    Ok(deleted)
}

/// result of a breadth-first walk over a subtree
struct SubtreeWalk {
    /// every folder visited, in visiting order, starting with the root
    visited: Vec<Uuid>,
    /// whether the walk stopped because it hit its target
    found: bool,
    /// levels seen so far, counting the root
    height: usize,
}

/// breadth-first walk over the live folders beneath `root_id`, stopping early if `target` is reached.
/// Revisiting a folder or exceeding [`MAX_TREE_DEPTH`] / [`MAX_SUBTREE_FOLDERS`] fails with [`FolderError::CorruptTree`]
fn walk_subtree(
    root_id: Uuid,
    user_id: &str,
    target: Option<Uuid>,
    con: &Connection,
) -> Result<SubtreeWalk, FolderError> {
    let mut pst = con.prepare(include_str!(
        "../assets/queries/folder/get_child_folder_ids.sql"
    ))?;
    let mut seen = HashSet::from([root_id]);
    let mut visited = vec![root_id];
    let mut queue = VecDeque::from([(root_id, 0usize)]);
    let mut height = 1;
    while let Some((folder_id, depth)) = queue.pop_front() {
        let children = pst
            .query_map(params![user_id, folder_id], |row| row.get::<_, Uuid>(0))?
            .collect::<Result<Vec<Uuid>, rusqlite::Error>>()?;
        for child in children {
            if !seen.insert(child) {
                return Err(corrupt_tree(child, "folder reachable from more than one parent"));
            }
            if depth + 1 >= MAX_TREE_DEPTH || visited.len() >= MAX_SUBTREE_FOLDERS {
                return Err(corrupt_tree(child, "subtree too deep or too wide"));
            }
            visited.push(child);
            height = height.max(depth + 2);
            if Some(child) == target {
                return Ok(SubtreeWalk {
                    visited,
                    found: true,
                    height,
                });
            }
            queue.push_back((child, depth + 1));
        }
    }
    Ok(SubtreeWalk {
        visited,
        found: false,
        height,
    })
}

fn corrupt_tree(folder_id: Uuid, reason: &str) -> FolderError {
    log::error!("Folder tree is corrupt at folder {folder_id}: {reason}");
    FolderError::CorruptTree(folder_id)
}

fn map_folder(row: &rusqlite::Row) -> Result<Folder, rusqlite::Error> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        deleted_at: row.get(6)?,
    })
}
