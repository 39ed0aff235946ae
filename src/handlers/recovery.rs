// Recovery chat endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::utils::ServiceError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRecoveryRequest {
    pub case_context: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRecoveryResponse {
    pub session_id: String,
    pub assistant_message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryMessageRequest {
    pub session_id: String,
    pub user_message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryMessageResponse {
    pub assistant_message: String,
}

pub async fn start_recovery(
    State(state): State<AppState>,
    Json(request): Json<StartRecoveryRequest>,
) -> Result<Json<StartRecoveryResponse>, ServiceError> {
    if request.case_context.is_null() {
        return Err(ServiceError::ValidationError(
            "caseContext is required".to_string(),
        ));
    }
    let session_id = state.recovery.start_session(request.case_context).await;
    Ok(Json(StartRecoveryResponse {
        session_id,
        assistant_message: state.recovery.greeting(),
    }))
}

pub async fn message_recovery(
    State(state): State<AppState>,
    Json(request): Json<RecoveryMessageRequest>,
) -> Result<Json<RecoveryMessageResponse>, ServiceError> {
    if request.user_message.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "userMessage must not be empty".to_string(),
        ));
    }
    let assistant_message = state
        .recovery
        .send_message(&request.session_id, &request.user_message)
        .await?;
    Ok(Json(RecoveryMessageResponse { assistant_message }))
}
