use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    api::chat::ChatRequest,
    app_error::{AppError, StdResponse},
    app_state::AppState,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/chat",
        OpenApiRouter::new().routes(utoipa_axum::routes!(send_chat_message)),
    )
}

#[derive(Serialize, ToSchema)]
struct ChatReply {
    reply: String,
}

/// Relay a message to the shopping assistant.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Chat"],
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant replied", body = StdResponse<ChatReply>),
        (status = 400, description = "Empty message")
    )
)]
async fn send_chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".into()));
    }

    let reply = state.chat.ask(&request).await;
    Ok(StdResponse::ok(ChatReply { reply }, "Assistant replied"))
}
