//! Tool argument decoding and validation.
//!
//! Loosely typed JSON arguments are checked here and turned into typed
//! values; the query compiler downstream never rejects anything.

use super::ToolError;
use chrono::NaiveDate;
use query::QueryArgs;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a tool's argument object.
pub fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// Arguments of `get_iati_projects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectSearchArgs {
    pub keyword: Option<String>,
    pub country_code: Option<String>,
    pub sample_size: Option<u32>,
    pub facet_field: Option<String>,
    pub facet_limit: Option<i64>,
    pub start: Option<u32>,
}

/// Arguments of `search_transactions` and `search_budgets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FinancialSearchArgs {
    pub keyword: Option<String>,
    pub country_code: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub activity_status_code: Option<String>,
    pub sample_size: Option<u32>,
    pub facet_field: Option<String>,
    pub facet_limit: Option<i64>,
    pub start: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodelistArgs {
    pub codelist_name: String,
}

impl CodelistArgs {
    /// The name is interpolated into a URL path, so only plain identifiers pass.
    pub fn validated_name(&self) -> Result<&str, ToolError> {
        let name = self.codelist_name.trim();
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if name.is_empty() || !name.chars().all(allowed) {
            return Err(ToolError::InvalidInput(format!(
                "invalid codelist name '{}'",
                self.codelist_name
            )));
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterpretArgs {
    pub question: String,
}

impl From<ProjectSearchArgs> for QueryArgs {
    fn from(args: ProjectSearchArgs) -> Self {
        QueryArgs {
            keyword: non_empty(args.keyword),
            country_code: non_empty(args.country_code),
            rows: args.sample_size,
            start: args.start,
            facet_field: non_empty(args.facet_field),
            facet_limit: args.facet_limit,
            ..Default::default()
        }
    }
}

impl From<FinancialSearchArgs> for QueryArgs {
    fn from(args: FinancialSearchArgs) -> Self {
        QueryArgs {
            keyword: non_empty(args.keyword),
            country_code: non_empty(args.country_code),
            min_value: args.min_value,
            max_value: args.max_value,
            start_date: args.start_date,
            end_date: args.end_date,
            activity_status_code: non_empty(args.activity_status_code),
            rows: args.sample_size,
            start: args.start,
            facet_field: non_empty(args.facet_field),
            facet_limit: args.facet_limit,
        }
    }
}

/// Blank strings count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_args_map_sample_size_to_rows() {
        let args: ProjectSearchArgs = decode(json!({
            "keyword": "water",
            "sample_size": 25,
            "unknown": true
        }))
        .unwrap();
        let query = QueryArgs::from(args);
        assert_eq!(query.rows, Some(25));
        assert_eq!(query.keyword.as_deref(), Some("water"));
    }

    #[test]
    fn financial_args_parse_dates() {
        let args: FinancialSearchArgs = decode(json!({
            "min_value": 1000,
            "start_date": "2020-01-01"
        }))
        .unwrap();
        let query = QueryArgs::from(args);
        assert_eq!(query.min_value, Some(1000.0));
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn rejects_bad_types_at_boundary() {
        let err = decode::<FinancialSearchArgs>(json!({ "start_date": "last year" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        let err = decode::<ProjectSearchArgs>(json!({ "sample_size": -3 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn blank_strings_are_absent() {
        let blank = json!({ "keyword": "  ", "country_code": "" });
        let args: ProjectSearchArgs = decode(blank).unwrap();
        assert_eq!(QueryArgs::from(args), QueryArgs::default());
    }

    #[test]
    fn codelist_name_validation() {
        let ok = CodelistArgs {
            codelist_name: " Sector ".into(),
        };
        assert_eq!(ok.validated_name().unwrap(), "Sector");
        let bad = CodelistArgs {
            codelist_name: "../secrets".into(),
        };
        assert!(bad.validated_name().is_err());
    }

    #[test]
    fn missing_required_field() {
        assert!(decode::<InterpretArgs>(json!({})).is_err());
    }
}
