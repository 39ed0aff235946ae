// Analysis submission endpoints: email text, bare URL, uploaded file.

use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::app::AppState;
use crate::models::{AnalysisRecord, SourceType};
use crate::utils::ServiceError;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeEmailRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeUrlRequest {
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

pub async fn analyze_email(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeEmailRequest>,
) -> Result<Json<AnalysisRecord>, ServiceError> {
    request.validate()?;
    let record = state
        .pipeline
        .run(&request.text, SourceType::Email, request.metadata)
        .await?;
    Ok(Json(record))
}

pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> Result<Json<AnalysisRecord>, ServiceError> {
    request.validate()?;
    // Framed so the ingestion stage extracts the URL like any other text.
    let text = format!("URL to analyze: {}", request.url);
    let record = state
        .pipeline
        .run(&text, SourceType::Url, request.metadata)
        .await?;
    Ok(Json(record))
}

pub async fn analyze_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisRecord>, ServiceError> {
    let mut content: Option<String> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
            content = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    let text = content.ok_or_else(|| ServiceError::ValidationError("No file part".to_string()))?;
    if text.is_empty() {
        return Err(ServiceError::ValidationError("Uploaded file is empty".to_string()));
    }

    let mut metadata = HashMap::new();
    if let Some(name) = filename {
        metadata.insert("filename".to_string(), Value::String(name));
    }

    let record = state
        .pipeline
        .run(&text, SourceType::File, metadata)
        .await?;
    Ok(Json(record))
}
