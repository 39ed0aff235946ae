// Aggregate statistics derived from the result store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::AnalysisRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Local calendar date, formatted YYYY-MM-DD.
    pub date: String,
    pub count: usize,
    pub high_risk_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandStat {
    pub name: String,
    pub count: usize,
    pub avg_threat_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_analyses: usize,
    pub high_risk_count: usize,
    pub top_category: String,
    pub avg_threat_score: f64,
    pub trend_data: Vec<TrendPoint>,
    pub category_breakdown: Vec<CategorySlice>,
    pub top_brands: Vec<BrandStat>,
    pub recent_high_risk: Vec<AnalysisRecord>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
