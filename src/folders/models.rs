use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;

/// display name of the implicit root every user's folders hang off of
pub static ROOT_NAME: &str = "Dashboard";
/// navigable path of the implicit root
pub static ROOT_HREF: &str = "/dashboard";

/// a single node in a user's folder tree, as stored in the Folders table
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct Folder {
    /// assigned at creation and never changed
    pub id: Uuid,
    /// unique among live siblings of the same owner
    pub name: String,
    /// `None` means the folder sits directly under the user's Dashboard
    pub parent_id: Option<Uuid>,
    /// the owner. Never compared across users
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// refreshed on every rename, move, and delete
    pub updated_at: DateTime<Utc>,
    /// set once the folder is soft deleted, and never cleared afterwards
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// one `(id, name)` step on the way from the root to a folder
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PathSegment {
    pub id: Uuid,
    pub name: String,
}

/// a navigable entry in the breadcrumb trail. The root entry has no id
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct Breadcrumb {
    pub id: Option<Uuid>,
    pub name: String,
    pub href: String,
}

/// placeholder for files inside of a folder. File management isn't implemented, so lists of these are always empty
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct FileSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(crate = "rocket::serde")]
pub struct FolderContents {
    /// live child folders, ordered by name
    pub folders: Vec<Folder>,
    pub files: Vec<FileSummary>,
}

/// everything needed to render a single folder (or the Dashboard when `folder` is `None`)
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(crate = "rocket::serde")]
pub struct FolderDataResponse {
    pub folder: Option<Folder>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub contents: FolderContents,
    pub total_folders: usize,
    pub total_files: usize,
}

impl Breadcrumb {
    /// the synthetic entry every breadcrumb trail starts with
    pub fn root() -> Breadcrumb {
        Breadcrumb {
            id: None,
            name: ROOT_NAME.to_string(),
            href: ROOT_HREF.to_string(),
        }
    }
}

impl From<PathSegment> for Breadcrumb {
    fn from(value: PathSegment) -> Self {
        Breadcrumb {
            href: format!("{ROOT_HREF}/folder/{}", value.id),
            id: Some(value.id),
            name: value.name,
        }
    }
}

impl FolderDataResponse {
    pub fn new(
        folder: Option<Folder>,
        breadcrumbs: Vec<Breadcrumb>,
        contents: FolderContents,
    ) -> FolderDataResponse {
        FolderDataResponse {
            folder,
            breadcrumbs,
            total_folders: contents.folders.len(),
            total_files: contents.files.len(),
            contents,
        }
    }
}
