// Result store
//
// Keyed collection of analysis records and their event logs, with
// whole-snapshot JSON persistence. The in-memory maps are authoritative;
// durability is best-effort and a failed snapshot write never fails the
// request that triggered it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::models::{
    AnalysisEvent, AnalysisRecord, BrandStat, CategorySlice, StatsSummary, TrendPoint,
};

const ANALYSES_SNAPSHOT: &str = "analyses_log.json";
const EVENTS_SNAPSHOT: &str = "events_log.json";

/// Records at or above this score count as high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 70;

#[derive(Error, Debug)]
pub enum StoreError {
    // Ids are freshly generated per run; a collision is an invariant
    // violation, not a recoverable condition.
    #[error("duplicate analysis id: {0}")]
    DuplicateId(String),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AnalysisStore {
    analyses: RwLock<HashMap<String, AnalysisRecord>>,
    events: RwLock<HashMap<String, Vec<AnalysisEvent>>>,
    snapshot_dir: Option<PathBuf>,
    // Serializes the snapshot-rewrite sequence so concurrent inserts for
    // different ids cannot interleave writes to the durable files.
    snapshot_lock: Mutex<()>,
}

impl AnalysisStore {
    /// Store without durable persistence. Used by tests and available for
    /// ephemeral deployments.
    pub fn in_memory() -> Self {
        Self {
            analyses: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            snapshot_dir: None,
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Opens a store backed by snapshot files in `dir`, rehydrating from
    /// existing snapshots. Missing or corrupt snapshots log and start
    /// empty rather than failing startup.
    pub fn open(dir: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("could not create data dir {}: {}", dir.display(), e);
        }

        let analyses: HashMap<String, AnalysisRecord> =
            load_snapshot(&dir.join(ANALYSES_SNAPSHOT));
        let events: HashMap<String, Vec<AnalysisEvent>> = load_snapshot(&dir.join(EVENTS_SNAPSHOT));
        info!(
            "loaded {} analyses and event logs for {} analyses from {}",
            analyses.len(),
            events.len(),
            dir.display()
        );

        Self {
            analyses: RwLock::new(analyses),
            events: RwLock::new(events),
            snapshot_dir: Some(dir.to_path_buf()),
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Inserts a freshly completed record and persists the snapshot.
    pub async fn put(&self, record: AnalysisRecord) -> Result<(), StoreError> {
        {
            let mut analyses = self.analyses.write().await;
            if analyses.contains_key(&record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
            analyses.insert(record.id.clone(), record);
        }

        // Best-effort durability: the in-memory store stays authoritative.
        if let Err(e) = self.persist().await {
            warn!("snapshot write failed, continuing in memory: {}", e);
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.analyses.read().await.get(id).cloned()
    }

    /// All records, createdAt descending. Ties broken by id so repeated
    /// calls return a stable order.
    pub async fn list(&self) -> Vec<AnalysisRecord> {
        let mut items: Vec<AnalysisRecord> = self.analyses.read().await.values().cloned().collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    pub async fn count(&self) -> usize {
        self.analyses.read().await.len()
    }

    /// Appends one telemetry event, creating the log on first use. Event
    /// logs exist for failed runs too; only records are success-gated.
    pub async fn append_event(&self, id: &str, event: AnalysisEvent) {
        self.events
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .push(event);
    }

    pub async fn events_for(&self, id: &str) -> Option<Vec<AnalysisEvent>> {
        self.events.read().await.get(id).cloned()
    }

    pub async fn compute_stats(&self) -> StatsSummary {
        let items = self.list().await;
        let total = items.len();

        let high_risk_count = items
            .iter()
            .filter(|r| r.threat_score >= HIGH_RISK_THRESHOLD)
            .count();

        let avg_threat_score = if total > 0 {
            items.iter().map(|r| r.threat_score as f64).sum::<f64>() / total as f64
        } else {
            0.0
        };

        // Count in list order (createdAt desc) so tie-breaks are
        // first-encountered and deterministic for a fixed store.
        let mut categories: Vec<(String, usize)> = Vec::new();
        for record in &items {
            let name = record.category.as_str().to_string();
            match categories.iter_mut().find(|(cat, _)| *cat == name) {
                Some((_, count)) => *count += 1,
                None => categories.push((name, 1)),
            }
        }
        let top_category = categories
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(cat, _)| cat.clone())
            .unwrap_or_else(|| "OTHER".to_string());

        let category_breakdown = categories
            .iter()
            .map(|(category, count)| CategorySlice {
                category: category.clone(),
                count: *count,
                percentage: *count as f64 / total as f64 * 100.0,
            })
            .collect();

        let trend_data = build_trend(&items);

        // Brand leaderboard, first-encounter insertion order as tie-break.
        let mut brands: Vec<(String, usize, u64)> = Vec::new();
        for record in &items {
            let Some(brand) = record.impersonated_brand.as_deref() else {
                continue;
            };
            if brand.is_empty() || brand == "None" {
                continue;
            }
            match brands.iter_mut().find(|(name, _, _)| name == brand) {
                Some((_, count, total_score)) => {
                    *count += 1;
                    *total_score += record.threat_score as u64;
                },
                None => brands.push((brand.to_string(), 1, record.threat_score as u64)),
            }
        }
        brands.sort_by(|a, b| b.1.cmp(&a.1));
        let top_brands = brands
            .into_iter()
            .take(5)
            .map(|(name, count, total_score)| BrandStat {
                name,
                count,
                avg_threat_score: total_score as f64 / count as f64,
            })
            .collect();

        let recent_high_risk = items
            .iter()
            .filter(|r| r.threat_score >= HIGH_RISK_THRESHOLD)
            .take(5)
            .cloned()
            .collect();

        let now = Utc::now();
        StatsSummary {
            total_analyses: total,
            high_risk_count,
            top_category,
            avg_threat_score,
            trend_data,
            category_breakdown,
            top_brands,
            recent_high_risk,
            start_date: now - Duration::days(7),
            end_date: now,
        }
    }

    /// Whole-snapshot rewrite of both durable files, behind the snapshot
    /// mutex so writes never interleave.
    async fn persist(&self) -> Result<(), StoreError> {
        let Some(dir) = &self.snapshot_dir else {
            return Ok(());
        };
        let _guard = self.snapshot_lock.lock().await;

        let analyses = self.analyses.read().await.clone();
        let events = self.events.read().await.clone();

        write_snapshot(&dir.join(ANALYSES_SNAPSHOT), &analyses)?;
        write_snapshot(&dir.join(EVENTS_SNAPSHOT), &events)?;
        Ok(())
    }
}

/// Seven local calendar dates ending today, each seeded with zero counts.
/// A record is counted iff its createdAt local date matches one of the
/// keys; older or future records are ignored, not clamped.
fn build_trend(items: &[AnalysisRecord]) -> Vec<TrendPoint> {
    let today = Local::now().date_naive();
    let mut window: Vec<TrendPoint> = (0..7)
        .rev()
        .map(|offset| TrendPoint {
            date: (today - Duration::days(offset)).format("%Y-%m-%d").to_string(),
            count: 0,
            high_risk_count: 0,
        })
        .collect();

    for record in items {
        let key = record
            .created_at
            .with_timezone(&Local)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string();
        if let Some(point) = window.iter_mut().find(|p| p.date == key) {
            point.count += 1;
            if record.threat_score >= HIGH_RISK_THRESHOLD {
                point.high_risk_count += 1;
            }
        }
    }
    window
}

fn load_snapshot<T: DeserializeOwned + Default>(path: &Path) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("corrupt snapshot {}, starting empty: {}", path.display(), e);
                T::default()
            },
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            warn!("unreadable snapshot {}, starting empty: {}", path.display(), e);
            T::default()
        },
    }
}

/// Atomic rewrite: write to a temp file, fsync, then rename over the
/// snapshot so an interrupted write cannot corrupt it.
fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = std::fs::File::create(&temp_path)?;
        std::io::Write::write_all(&mut file, content.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
