use rocket::serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateFolderRequest {
    pub name: String,
    /// `None` creates the folder on the Dashboard
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RenameFolderRequest {
    pub name: String,
}

#[derive(Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MoveFolderRequest {
    /// `None` moves the folder to the Dashboard
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}
