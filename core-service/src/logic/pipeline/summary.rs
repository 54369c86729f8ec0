use serde::Serialize;

use crate::logic::history::HistoryRecord;
use crate::logic::labels::FaultCategory;

/// Share of one category in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: FaultCategory,
    pub count: usize,
    pub percentage: f64,
}

/// Counts per predicted category, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub total: usize,
    pub categories: Vec<CategoryShare>,
}

impl PredictionSummary {
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let total = records.len();

        // FaultCategory::all() order breaks ties
        let mut categories: Vec<CategoryShare> = FaultCategory::all()
            .into_iter()
            .map(|category| {
                let count = records
                    .iter()
                    .filter(|r| r.prediction.fault_category == category)
                    .count();
                CategoryShare {
                    category,
                    count,
                    percentage: if total > 0 { count as f64 * 100.0 / total as f64 } else { 0.0 },
                }
            })
            .filter(|share| share.count > 0)
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        Self { total, categories }
    }

    pub fn count(&self, category: FaultCategory) -> usize {
        self.categories
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn log(&self) {
        log::info!("Prediction summary ({} rows):", self.total);
        for share in &self.categories {
            log::info!("- {}: {} ({:.1}%)", share.category, share.count, share.percentage);
        }
    }
}
