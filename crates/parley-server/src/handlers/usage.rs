use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// GET /
pub async fn root(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": format!("{} backend is running", state.chat.settings().agent_name),
        "started_at": state.started_at.to_rfc3339(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /api/v1/usage
pub async fn get_usage(state: web::Data<AppState>) -> HttpResponse {
    let gateway = state.chat.gateway();
    let limiter = gateway.rate_limiter();
    let in_window = limiter.in_window().await;

    HttpResponse::Ok().json(json!({
        "provider": gateway.provider().profile(),
        "usage": gateway.usage().snapshot(),
        "rate_limit": {
            "capacity": limiter.capacity(),
            "in_window": in_window,
        },
    }))
}
