//! Structured query compilation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Output format requested from the Datastore.
pub const OUTPUT_FORMAT: &str = "json";

/// Page size used when `rows` is not given.
pub const DEFAULT_ROWS: u32 = 10;

/// Facet bucket count used when `facet_limit` is not given.
pub const DEFAULT_FACET_LIMIT: i64 = 20;

/// Predicate used when no clause applies.
pub const MATCH_ALL: &str = "*:*";

/// Target result collection of a Datastore search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Activity,
    Transaction,
    Budget,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Activity => "activity",
            Collection::Transaction => "transaction",
            Collection::Budget => "budget",
        }
    }

    /// Field the value range applies to.
    ///
    /// Only transactions have their own value field; every other
    /// collection filters on budget value.
    pub fn value_field(self) -> &'static str {
        match self {
            Collection::Transaction => "transaction_value",
            Collection::Activity | Collection::Budget => "budget_value",
        }
    }

    /// Field the date range applies to.
    pub fn date_field(self) -> &'static str {
        match self {
            Collection::Transaction => "transaction_date_iso_date",
            Collection::Activity | Collection::Budget => "activity_date_iso_date",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "activity" => Ok(Collection::Activity),
            "transaction" => Ok(Collection::Transaction),
            "budget" => Ok(Collection::Budget),
            other => Err(format!(
                "unknown collection '{other}' (expected activity, transaction or budget)"
            )),
        }
    }
}

/// Search parameters for one translation call. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    pub keyword: Option<String>,
    pub country_code: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub activity_status_code: Option<String>,
    pub rows: Option<u32>,
    pub start: Option<u32>,
    pub facet_field: Option<String>,
    pub facet_limit: Option<i64>,
}

/// Faceting directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub field: String,
    pub limit: i64,
}

/// A compiled Datastore query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub rows: u32,
    pub start: Option<u32>,
    pub q: String,
    pub facet: Option<Facet>,
}

impl CompiledQuery {
    /// The query as `(name, value)` parameter pairs.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("wt", OUTPUT_FORMAT.to_string()),
            ("rows", self.rows.to_string()),
        ];
        if let Some(start) = self.start {
            params.push(("start", start.to_string()));
        }
        params.push(("q", self.q.clone()));
        if let Some(facet) = &self.facet {
            params.push(("facet", "true".to_string()));
            params.push(("facet.field", facet.field.clone()));
            params.push(("facet.limit", facet.limit.to_string()));
        }
        params
    }

    /// Value of a single parameter, if set.
    pub fn get(&self, name: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

impl Serialize for CompiledQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let params = self.params();
        let mut map = serializer.serialize_map(Some(params.len()))?;
        for (key, value) in &params {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Compile `args` into a query against `collection`.
///
/// Clause order is fixed: free text, country, status, value range, date range.
/// A range with one missing bound uses `*` for it.
pub fn compile(args: &QueryArgs, collection: Collection) -> CompiledQuery {
    let mut clauses = Vec::new();

    if let Some(keyword) = &args.keyword {
        clauses.push(format!("({keyword})"));
    }
    if let Some(country) = &args.country_code {
        clauses.push(format!("recipient_country_code:{country}"));
    }
    if let Some(status) = &args.activity_status_code {
        clauses.push(format!("activity_status_code:{status}"));
    }
    if args.min_value.is_some() || args.max_value.is_some() {
        clauses.push(range_clause(
            collection.value_field(),
            args.min_value.as_ref(),
            args.max_value.as_ref(),
        ));
    }
    if args.start_date.is_some() || args.end_date.is_some() {
        clauses.push(range_clause(
            collection.date_field(),
            args.start_date.as_ref(),
            args.end_date.as_ref(),
        ));
    }

    let q = if clauses.is_empty() {
        MATCH_ALL.to_string()
    } else {
        clauses.join(" AND ")
    };

    let facet = args.facet_field.as_ref().map(|field| Facet {
        field: field.clone(),
        limit: args.facet_limit.unwrap_or(DEFAULT_FACET_LIMIT),
    });

    CompiledQuery {
        rows: args.rows.unwrap_or(DEFAULT_ROWS),
        start: args.start,
        q,
        facet,
    }
}

pub fn compile_activity_query(args: &QueryArgs) -> CompiledQuery {
    compile(args, Collection::Activity)
}

pub fn compile_transaction_query(args: &QueryArgs) -> CompiledQuery {
    compile(args, Collection::Transaction)
}

pub fn compile_budget_query(args: &QueryArgs) -> CompiledQuery {
    compile(args, Collection::Budget)
}

fn range_clause<T: fmt::Display>(field: &str, low: Option<&T>, high: Option<&T>) -> String {
    let bound = |b: Option<&T>| b.map_or_else(|| "*".to_string(), T::to_string);
    format!("{field}:[{} TO {}]", bound(low), bound(high))
}
