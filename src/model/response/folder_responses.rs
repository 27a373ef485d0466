use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::folders::models::{Folder, FolderDataResponse};
use crate::model::error::folder_errors::FolderError;
use crate::model::response::BasicMessage;

type NoContent = ();

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct AllFoldersResponse {
    pub folders: Vec<Folder>,
}

/// every way a folder request can fail. Each [`FolderError`] maps to exactly one of these
#[derive(Responder, Debug)]
pub enum FolderFailureResponse {
    #[response(status = 400, content_type = "json")]
    BadRequest(Json<BasicMessage>),
    #[response(status = 404, content_type = "json")]
    FolderNotFound(Json<BasicMessage>),
    #[response(status = 409, content_type = "json")]
    FolderAlreadyExists(Json<BasicMessage>),
    #[response(status = 422, content_type = "json")]
    IllegalMove(Json<BasicMessage>),
    #[response(status = 500, content_type = "json")]
    FolderDbError(Json<BasicMessage>),
}

#[derive(Responder)]
pub enum GetFolderResponse {
    #[response(status = 200)]
    Success(Json<FolderDataResponse>),
    Failure(FolderFailureResponse),
}

#[derive(Responder)]
pub enum GetAllFoldersResponse {
    #[response(status = 200)]
    Success(Json<AllFoldersResponse>),
    Failure(FolderFailureResponse),
}

#[derive(Responder)]
pub enum CreateFolderResponse {
    #[response(status = 201)]
    Success(Json<Folder>),
    Failure(FolderFailureResponse),
}

#[derive(Responder)]
pub enum UpdateFolderResponse {
    #[response(status = 200)]
    Success(Json<Folder>),
    Failure(FolderFailureResponse),
}

#[derive(Responder)]
pub enum DeleteFolderResponse {
    #[response(status = 204)]
    Success(NoContent),
    Failure(FolderFailureResponse),
}

impl From<FolderError> for FolderFailureResponse {
    fn from(value: FolderError) -> Self {
        match value {
            FolderError::Validation(reason) => {
                FolderFailureResponse::BadRequest(Json::from(BasicMessage::from(reason)))
            }
            FolderError::InvalidParent | FolderError::InvalidDestination => {
                FolderFailureResponse::BadRequest(BasicMessage::new(&value.to_string()))
            }
            FolderError::NotFound => FolderFailureResponse::FolderNotFound(BasicMessage::new(
                "The requested folder does not exist or you don't have access to it.",
            )),
            FolderError::DuplicateName => {
                FolderFailureResponse::FolderAlreadyExists(BasicMessage::new(&value.to_string()))
            }
            FolderError::IllegalMove => {
                FolderFailureResponse::IllegalMove(BasicMessage::new(&value.to_string()))
            }
            FolderError::CorruptTree(_) | FolderError::DbFailure(_) => {
                FolderFailureResponse::FolderDbError(BasicMessage::new(
                    "Failed to process folder request. Check server logs for details",
                ))
            }
        }
    }
}
