// Shared application state handed to every handler.

use std::sync::Arc;

use crate::app_config::AppConfig;
use crate::services::{AnalysisPipeline, AnalysisStore, RecoveryChatService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<AnalysisStore>,
    pub pipeline: Arc<AnalysisPipeline>,
    pub recovery: Arc<RecoveryChatService>,
}
