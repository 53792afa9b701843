use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use parley_observability::create_request_span;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub metadata: MessageMetadata,
}

#[derive(Debug, Serialize)]
pub struct MessageMetadata {
    pub turn_id: u64,
}

/// POST /api/v1/message
pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<MessageRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let user_id = request.user_id.trim();
    let message = request.message.trim();

    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }

    let span = create_request_span(&Uuid::new_v4().to_string());
    let reply = state
        .chat
        .handle_message(user_id, message)
        .instrument(span)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        reply: reply.reply,
        metadata: MessageMetadata {
            turn_id: reply.turn_id,
        },
    }))
}
