use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    action::{ActionReply, ACTION_NAME},
    token::{extract, TokenParameters},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<TokenParameters>,
}

#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub success: bool,
    pub messages: Vec<String>,
}

pub async fn validate_handler(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Json<ValidateResponse> {
    let valid = state.action.validate(&request.text);
    Json(ValidateResponse {
        valid,
        parameters: if valid { extract(&request.text) } else { None },
    })
}

pub async fn create_token_handler(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Json<CreateTokenResponse> {
    info!("Received {} request over HTTP", ACTION_NAME);

    let mut replies: Vec<ActionReply> = Vec::new();
    let success = state
        .action
        .handle(&request.text, |reply| replies.push(reply))
        .await;

    Json(CreateTokenResponse {
        success,
        messages: replies.into_iter().map(|r| r.text).collect(),
    })
}
