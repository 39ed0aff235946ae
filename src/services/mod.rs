// ============================================================================
// Service layer: pipeline orchestration, result storage, recovery chat
// ============================================================================

pub mod pipeline;
pub mod recovery_chat;
pub mod store;

pub use pipeline::{AnalysisPipeline, PipelineError};
pub use recovery_chat::{RecoveryChatError, RecoveryChatService};
pub use store::{AnalysisStore, StoreError, HIGH_RISK_THRESHOLD};
