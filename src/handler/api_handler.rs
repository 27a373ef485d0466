use rocket::serde::{json::Json, Deserialize, Serialize};
use rocket::Request;

use crate::model::response::BasicMessage;

static API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: API_VERSION.to_string(),
    })
}

/// rejected request guards otherwise fall back to rocket's html error page
#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<BasicMessage> {
    BasicMessage::new("Authentication required. Include 'Authorization: Bearer <token>' in your request.")
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<BasicMessage> {
    BasicMessage::new("The requested resource could not be found.")
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<BasicMessage> {
    BasicMessage::new("Request body is missing required fields or has an invalid format.")
}
