use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub user_id: String,
}

/// POST /api/v1/reset
///
/// Clears the short-term buffer only; stored facts survive.
pub async fn reset_session(
    state: web::Data<AppState>,
    body: web::Json<ResetRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = body.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }

    state.chat.reset(user_id);
    info!("Session reset for {}", user_id);

    Ok(HttpResponse::Ok().json(json!({
        "status": "cleared",
        "user_id": user_id,
    })))
}
