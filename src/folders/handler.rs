use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::folders::service::FolderService;
use crate::guard::AuthenticatedUser;
use crate::model::request::folder_requests::{
    CreateFolderRequest, MoveFolderRequest, RenameFolderRequest,
};
use crate::model::response::folder_responses::{
    AllFoldersResponse, CreateFolderResponse, DeleteFolderResponse, GetAllFoldersResponse,
    GetFolderResponse, UpdateFolderResponse,
};

/// the Dashboard view: top-level folders plus the root breadcrumb
#[get("/folders")]
pub fn get_root_folder(user: AuthenticatedUser, service: &State<FolderService>) -> GetFolderResponse {
    match service.get_folder_view(&user.user_id, None) {
        Ok(view) => GetFolderResponse::Success(Json::from(view)),
        Err(e) => GetFolderResponse::Failure(e.into()),
    }
}

#[get("/folders/all")]
pub fn get_all_folders(
    user: AuthenticatedUser,
    service: &State<FolderService>,
) -> GetAllFoldersResponse {
    match service.get_all_folders(&user.user_id) {
        Ok(folders) => GetAllFoldersResponse::Success(Json::from(AllFoldersResponse { folders })),
        Err(e) => GetAllFoldersResponse::Failure(e.into()),
    }
}

#[get("/folders/<id>")]
pub fn get_folder(
    id: Uuid,
    user: AuthenticatedUser,
    service: &State<FolderService>,
) -> GetFolderResponse {
    match service.get_folder_view(&user.user_id, Some(id)) {
        Ok(view) => GetFolderResponse::Success(Json::from(view)),
        Err(e) => GetFolderResponse::Failure(e.into()),
    }
}

#[post("/folders", data = "<folder>")]
pub fn create_folder(
    user: AuthenticatedUser,
    folder: Json<CreateFolderRequest>,
    service: &State<FolderService>,
) -> CreateFolderResponse {
    match service.create_folder(&user.user_id, &folder.name, folder.parent_id) {
        Ok(created) => CreateFolderResponse::Success(Json::from(created)),
        Err(e) => CreateFolderResponse::Failure(e.into()),
    }
}

#[put("/folders/<id>", data = "<folder>")]
pub fn rename_folder(
    id: Uuid,
    user: AuthenticatedUser,
    folder: Json<RenameFolderRequest>,
    service: &State<FolderService>,
) -> UpdateFolderResponse {
    match service.rename_folder(&user.user_id, id, &folder.name) {
        Ok(renamed) => UpdateFolderResponse::Success(Json::from(renamed)),
        Err(e) => UpdateFolderResponse::Failure(e.into()),
    }
}

#[put("/folders/<id>/move", data = "<destination>")]
pub fn move_folder(
    id: Uuid,
    user: AuthenticatedUser,
    destination: Json<MoveFolderRequest>,
    service: &State<FolderService>,
) -> UpdateFolderResponse {
    match service.move_folder(&user.user_id, id, destination.parent_id) {
        Ok(moved) => UpdateFolderResponse::Success(Json::from(moved)),
        Err(e) => UpdateFolderResponse::Failure(e.into()),
    }
}

#[delete("/folders/<id>")]
pub fn delete_folder(
    id: Uuid,
    user: AuthenticatedUser,
    service: &State<FolderService>,
) -> DeleteFolderResponse {
    match service.delete_folder(&user.user_id, id) {
        Ok(()) => DeleteFolderResponse::Success(()),
        Err(e) => DeleteFolderResponse::Failure(e.into()),
    }
}
