// Data models for the scam analysis pipeline

pub mod analysis;
pub mod artifact;
pub mod assessment;
pub mod indicators;
pub mod stats;

pub use analysis::{
    AnalysisEvent, AnalysisRecord, AnalysisStatus, DebugArtifacts, EventAction, IndicatorSet,
    SourceType, ThreatCategory, TimelineEntry, TimelineStatus,
};
pub use artifact::{BodyContent, ExtractedEntities, MessageArtifact, SenderInfo};
pub use assessment::{ActionPriority, RecommendedAction, RiskAssessment, SeverityLabel};
pub use indicators::{BrandImpersonation, IndicatorReport, SenderMismatch};
pub use stats::{BrandStat, CategorySlice, StatsSummary, TrendPoint};
