//! Fault Labels
//!
//! Maps classifier class indices to business labels and advisory messages.
//! Indices outside the table map to `Unknown` instead of failing, so a model
//! with a wider label space degrades gracefully.

use serde::{Deserialize, Serialize};

// ============================================================================
// FAULT CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultCategory {
    #[serde(rename = "No Fault")]
    NoFault,
    #[serde(rename = "Engine Fault")]
    EngineFault,
    #[serde(rename = "Electrical Fault")]
    ElectricalFault,
    #[serde(rename = "Emission Fault")]
    EmissionFault,
    #[serde(rename = "Transmission Fault")]
    TransmissionFault,
    #[serde(rename = "Unknown Fault")]
    Unknown,
}

/// Class index → category, as the classifier was trained
const LABEL_TABLE: [(i64, FaultCategory); 5] = [
    (0, FaultCategory::ElectricalFault),
    (1, FaultCategory::EmissionFault),
    (2, FaultCategory::EngineFault),
    (3, FaultCategory::NoFault),
    (4, FaultCategory::TransmissionFault),
];

impl FaultCategory {
    /// Never fails: unmapped indices become `Unknown`
    pub fn from_class_index(index: i64) -> Self {
        LABEL_TABLE
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, category)| *category)
            .unwrap_or(FaultCategory::Unknown)
    }

    pub fn class_index(&self) -> Option<i64> {
        LABEL_TABLE
            .iter()
            .find(|(_, category)| category == self)
            .map(|(i, _)| *i)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCategory::NoFault => "No Fault",
            FaultCategory::EngineFault => "Engine Fault",
            FaultCategory::ElectricalFault => "Electrical Fault",
            FaultCategory::EmissionFault => "Emission Fault",
            FaultCategory::TransmissionFault => "Transmission Fault",
            FaultCategory::Unknown => "Unknown Fault",
        }
    }

    pub fn advisory_message(&self) -> &'static str {
        match self {
            FaultCategory::NoFault => {
                "✅ The system is running smoothly and no faults are expected."
            }
            FaultCategory::EngineFault => {
                "⚠️🔧 Warning: a possible fault was detected in engine components. \
                 An immediate inspection is recommended."
            }
            FaultCategory::ElectricalFault => {
                "⚠️⚡ Warning: an electrical fault is likely to occur soon. \
                 Checking the electrical systems is recommended."
            }
            FaultCategory::EmissionFault => {
                "⚠️🌫️ Attention: there are signs of a possible problem in the emission system."
            }
            FaultCategory::TransmissionFault => {
                "⚠️⚙️ Urgent attention: a transmission fault may occur within minutes."
            }
            FaultCategory::Unknown => "❗ Unknown fault type, please review.",
        }
    }

    /// Dashboard color
    pub fn color(&self) -> &'static str {
        match self {
            FaultCategory::NoFault => "#10b981",           // Green
            FaultCategory::EngineFault => "#f59e0b",       // Amber
            FaultCategory::ElectricalFault => "#3b82f6",   // Blue
            FaultCategory::EmissionFault => "#8b5cf6",     // Violet
            FaultCategory::TransmissionFault => "#ef4444", // Red
            FaultCategory::Unknown => "#64748b",           // Slate
        }
    }

    pub fn is_fault(&self) -> bool {
        !matches!(self, FaultCategory::NoFault)
    }

    /// Known categories followed by `Unknown`
    pub fn all() -> [FaultCategory; 6] {
        [
            FaultCategory::NoFault,
            FaultCategory::EngineFault,
            FaultCategory::ElectricalFault,
            FaultCategory::EmissionFault,
            FaultCategory::TransmissionFault,
            FaultCategory::Unknown,
        ]
    }
}

impl std::fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PREDICTION RESULT
// ============================================================================

/// Mapped prediction for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_index: i64,
    pub fault_category: FaultCategory,
    pub advisory_message: String,
}

impl PredictionResult {
    pub fn from_class_index(class_index: i64) -> Self {
        let fault_category = FaultCategory::from_class_index(class_index);
        Self {
            class_index,
            fault_category,
            advisory_message: fault_category.advisory_message().to_string(),
        }
    }
}

pub fn map_classes(classes: &[i64]) -> Vec<PredictionResult> {
    classes.iter().map(|&c| PredictionResult::from_class_index(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_indices() {
        assert_eq!(FaultCategory::from_class_index(0), FaultCategory::ElectricalFault);
        assert_eq!(FaultCategory::from_class_index(1), FaultCategory::EmissionFault);
        assert_eq!(FaultCategory::from_class_index(2), FaultCategory::EngineFault);
        assert_eq!(FaultCategory::from_class_index(3), FaultCategory::NoFault);
        assert_eq!(FaultCategory::from_class_index(4), FaultCategory::TransmissionFault);
    }

    #[test]
    fn test_unknown_indices_do_not_fail() {
        for index in [-1, 5, 42, i64::MAX] {
            let result = PredictionResult::from_class_index(index);
            assert_eq!(result.fault_category, FaultCategory::Unknown);
            assert_eq!(result.advisory_message, FaultCategory::Unknown.advisory_message());
            assert_eq!(result.class_index, index);
        }
    }

    #[test]
    fn test_index_round_trip_for_known_categories() {
        for category in FaultCategory::all() {
            match category.class_index() {
                Some(i) => assert_eq!(FaultCategory::from_class_index(i), category),
                None => assert_eq!(category, FaultCategory::Unknown),
            }
        }
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&FaultCategory::EngineFault).unwrap();
        assert_eq!(json, "\"Engine Fault\"");
        assert_eq!(FaultCategory::NoFault.to_string(), "No Fault");
    }

    #[test]
    fn test_messages_are_distinct() {
        let messages: std::collections::HashSet<_> =
            FaultCategory::all().iter().map(|c| c.advisory_message()).collect();
        assert_eq!(messages.len(), 6);
    }
}
