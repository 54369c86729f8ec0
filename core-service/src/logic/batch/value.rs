//! Raw cell values as they arrive in an upload.

/// Tokens read as "missing", same set pandas treats as NA by default
pub const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL",
    "None", "#N/A", "#NA", "<NA>", "1.#QNAN", "-1.#QNAN", "1.#IND", "-1.#IND",
];

/// One raw cell: number, text or missing marker
///
/// Numbers parsed from text keep that text in `raw`, so a column that turns
/// out to be categorical still sees `"007"` rather than `7`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number { value: f64, raw: Option<String> },
    Text(String),
    Missing,
}

impl RawValue {
    /// Number with no source text (JSON uploads, tests)
    pub fn number(value: f64) -> Self {
        RawValue::Number { value, raw: None }
    }

    /// Parse a CSV cell
    pub fn parse_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if NA_TOKENS.contains(&trimmed) {
            return RawValue::Missing;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => RawValue::Missing,
            Ok(value) => RawValue::Number {
                value,
                raw: Some(cell.to_string()),
            },
            Err(_) => RawValue::Text(cell.to_string()),
        }
    }

    /// Convert a JSON value from a records upload
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Missing,
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(RawValue::number)
                .unwrap_or(RawValue::Missing),
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Bool(b) => RawValue::Text(b.to_string()),
            // Nested values are kept as their JSON text
            other => RawValue::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    /// Finite numeric value. `inf` and overflowing literals parse as numbers
    /// but are not usable features, so they read as `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number { value, .. } if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Category key used by the encoder: the cell text as uploaded,
    /// numbers without source text in shortest form
    pub fn category_key(&self) -> Option<String> {
        match self {
            RawValue::Number { raw: Some(raw), .. } => Some(raw.clone()),
            RawValue::Number { value, raw: None } => Some(format_number(*value)),
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Missing => None,
        }
    }

    /// Original field value. In a text column (`as_text`) numbers are
    /// returned as their source text, the way an object column keeps them.
    pub fn to_json(&self, as_text: bool) -> serde_json::Value {
        match self {
            RawValue::Number { .. } if as_text => self
                .category_key()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
            RawValue::Number { value, raw } => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .or_else(|| raw.clone().map(serde_json::Value::String))
                .unwrap_or(serde_json::Value::Null),
            RawValue::Text(s) => serde_json::Value::String(s.clone()),
            RawValue::Missing => serde_json::Value::Null,
        }
    }
}

fn format_number(n: f64) -> String {
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_kinds() {
        assert_eq!(RawValue::parse_cell("12.5").as_number(), Some(12.5));
        assert_eq!(RawValue::parse_cell(" 7 ").as_number(), Some(7.0));
        assert_eq!(RawValue::parse_cell("Petrol"), RawValue::Text("Petrol".to_string()));
        assert_eq!(RawValue::parse_cell(""), RawValue::Missing);
        assert_eq!(RawValue::parse_cell("NaN"), RawValue::Missing);
        assert_eq!(RawValue::parse_cell("N/A"), RawValue::Missing);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(RawValue::from_json(&serde_json::json!(null)), RawValue::Missing);
        assert_eq!(RawValue::from_json(&serde_json::json!(3)), RawValue::number(3.0));
        assert_eq!(RawValue::from_json(&serde_json::json!(true)), RawValue::Text("true".into()));
    }

    #[test]
    fn test_category_key_for_integral_number() {
        assert_eq!(RawValue::number(3.0).category_key().as_deref(), Some("3"));
        assert_eq!(RawValue::number(2.5).category_key().as_deref(), Some("2.5"));
        assert_eq!(RawValue::Missing.category_key(), None);
    }

    #[test]
    fn test_numeric_text_keeps_source_form() {
        for text in ["007", "1.50", "1e3"] {
            let cell = RawValue::parse_cell(text);
            assert_eq!(cell.category_key().as_deref(), Some(text));
            assert_eq!(cell.to_json(true), serde_json::json!(text));
        }
        assert_eq!(RawValue::parse_cell("007").to_json(false), serde_json::json!(7.0));
    }

    #[test]
    fn test_non_finite_is_not_a_number() {
        for text in ["inf", "-inf", "infinity", "1e999"] {
            let cell = RawValue::parse_cell(text);
            assert!(!cell.is_missing());
            assert_eq!(cell.as_number(), None);
            assert_eq!(cell.to_json(false), serde_json::json!(text));
        }
    }
}
