// Integration tests for the stats rollup: counts, breakdowns, the brand
// leaderboard, and the seven-day trend window.

mod common;

use chrono::{Duration, Local, Utc};
use scamscan_backend::models::ThreatCategory;
use scamscan_backend::services::AnalysisStore;

use common::make_record;

#[tokio::test]
async fn empty_store_yields_zeroed_summary() {
    let store = AnalysisStore::in_memory();
    let stats = store.compute_stats().await;

    assert_eq!(stats.total_analyses, 0);
    assert_eq!(stats.high_risk_count, 0);
    assert_eq!(stats.avg_threat_score, 0.0);
    assert!(stats.category_breakdown.is_empty());
    assert!(stats.top_brands.is_empty());
    assert!(stats.recent_high_risk.is_empty());

    // The trend window always covers seven days, all zero.
    assert_eq!(stats.trend_data.len(), 7);
    assert!(stats.trend_data.iter().all(|p| p.count == 0 && p.high_risk_count == 0));
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(stats.trend_data.last().unwrap().date, today);
}

#[tokio::test]
async fn breakdown_and_averages_cover_all_records() {
    let store = AnalysisStore::in_memory();
    let now = Utc::now();
    store
        .put(make_record("a1", 90, ThreatCategory::Phishing, None, now))
        .await
        .unwrap();
    store
        .put(make_record("a2", 70, ThreatCategory::Phishing, None, now))
        .await
        .unwrap();
    store
        .put(make_record("a3", 20, ThreatCategory::Other, None, now))
        .await
        .unwrap();

    let stats = store.compute_stats().await;
    assert_eq!(stats.total_analyses, 3);
    // 90 and 70 meet the threshold, 20 does not.
    assert_eq!(stats.high_risk_count, 2);
    assert_eq!(stats.avg_threat_score, 60.0);
    assert_eq!(stats.top_category, "PHISHING");

    let total: usize = stats.category_breakdown.iter().map(|c| c.count).sum();
    assert_eq!(total, 3);
    let percent: f64 = stats.category_breakdown.iter().map(|c| c.percentage).sum();
    assert!((percent - 100.0).abs() < 1e-9);

    let phishing = stats
        .category_breakdown
        .iter()
        .find(|c| c.category == "PHISHING")
        .unwrap();
    assert_eq!(phishing.count, 2);
}

#[tokio::test]
async fn brand_leaderboard_skips_absent_brands() {
    let store = AnalysisStore::in_memory();
    let now = Utc::now();
    store
        .put(make_record("a1", 80, ThreatCategory::Phishing, Some("paypal"), now))
        .await
        .unwrap();
    store
        .put(make_record("a2", 60, ThreatCategory::Phishing, Some("paypal"), now))
        .await
        .unwrap();
    store
        .put(make_record("a3", 90, ThreatCategory::Phishing, Some("chase"), now))
        .await
        .unwrap();
    store
        .put(make_record("a4", 90, ThreatCategory::Other, Some("None"), now))
        .await
        .unwrap();
    store
        .put(make_record("a5", 10, ThreatCategory::Other, None, now))
        .await
        .unwrap();

    let stats = store.compute_stats().await;
    assert_eq!(stats.top_brands.len(), 2);
    assert_eq!(stats.top_brands[0].name, "paypal");
    assert_eq!(stats.top_brands[0].count, 2);
    assert_eq!(stats.top_brands[0].avg_threat_score, 70.0);
    assert_eq!(stats.top_brands[1].name, "chase");
    assert_eq!(stats.top_brands[1].count, 1);
}

#[tokio::test]
async fn trend_window_is_inclusive_of_day_six() {
    let store = AnalysisStore::in_memory();
    let now = Utc::now();
    store
        .put(make_record("edge", 80, ThreatCategory::Phishing, None, now - Duration::days(6)))
        .await
        .unwrap();
    store
        .put(make_record("outside", 80, ThreatCategory::Phishing, None, now - Duration::days(8)))
        .await
        .unwrap();
    store
        .put(make_record("today", 10, ThreatCategory::Other, None, now))
        .await
        .unwrap();

    let stats = store.compute_stats().await;
    let counted: usize = stats.trend_data.iter().map(|p| p.count).sum();
    // "outside" falls before the window and is dropped from the trend.
    assert_eq!(counted, 2);
    let high_risk: usize = stats.trend_data.iter().map(|p| p.high_risk_count).sum();
    assert_eq!(high_risk, 1);

    assert_eq!(stats.trend_data.last().unwrap().count, 1);
}

#[tokio::test]
async fn recent_high_risk_caps_at_five_newest() {
    let store = AnalysisStore::in_memory();
    let now = Utc::now();
    for i in 0..7 {
        store
            .put(make_record(
                &format!("a{}", i),
                85,
                ThreatCategory::Phishing,
                None,
                now - Duration::minutes(i),
            ))
            .await
            .unwrap();
    }

    let stats = store.compute_stats().await;
    assert_eq!(stats.recent_high_risk.len(), 5);
    // Newest first.
    assert_eq!(stats.recent_high_risk[0].id, "a0");
    assert_eq!(stats.recent_high_risk[4].id, "a4");
}
