//! Tool definitions advertised through tools/list.

use mcp::Tool;
use serde_json::{Map, Value, json};

pub const GET_PROJECTS: &str = "get_iati_projects";
pub const SEARCH_TRANSACTIONS: &str = "search_transactions";
pub const SEARCH_BUDGETS: &str = "search_budgets";
pub const GET_CODELIST: &str = "get_codelist";
pub const INTERPRET_QUERY: &str = "interpret_query";

fn object_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn common_properties() -> Map<String, Value> {
    object_map(json!({
        "keyword": { "type": "string", "description": "Free-text search terms" },
        "country_code": { "type": "string", "description": "ISO 3166-1 alpha-2 recipient country code, e.g. KE" },
        "sample_size": { "type": "integer", "minimum": 0, "description": "Number of rows to return (default 10)" },
        "start": { "type": "integer", "minimum": 0, "description": "Offset of the first row" },
        "facet_field": { "type": "string", "description": "Field to return grouped counts for" },
        "facet_limit": { "type": "integer", "description": "Number of facet buckets (default 20)" }
    }))
}

fn financial_properties() -> Map<String, Value> {
    let mut props = common_properties();
    props.extend(object_map(json!({
        "min_value": { "type": "number", "description": "Lower bound of the value range" },
        "max_value": { "type": "number", "description": "Upper bound of the value range" },
        "start_date": { "type": "string", "format": "date", "description": "Earliest date (YYYY-MM-DD)" },
        "end_date": { "type": "string", "format": "date", "description": "Latest date (YYYY-MM-DD)" },
        "activity_status_code": {
            "type": "string",
            "description": "IATI ActivityStatus code, e.g. 2 for implementation"
        }
    })));
    props
}

fn object_schema(properties: Map<String, Value>, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

/// Every tool this server exposes.
pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            GET_PROJECTS,
            "Search IATI activities (projects) in the Datastore.",
            object_schema(common_properties(), &[]),
        ),
        tool(
            SEARCH_TRANSACTIONS,
            "Search IATI transactions by keyword, country, status, value and date range.",
            object_schema(financial_properties(), &[]),
        ),
        tool(
            SEARCH_BUDGETS,
            "Search IATI budgets by keyword, country, status, value and date range.",
            object_schema(financial_properties(), &[]),
        ),
        tool(
            GET_CODELIST,
            "Fetch a published IATI codelist (e.g. Country, Sector, ActivityStatus).",
            object_schema(
                object_map(json!({
                    "codelist_name": { "type": "string", "description": "Codelist name, e.g. Sector" }
                })),
                &["codelist_name"],
            ),
        ),
        tool(
            INTERPRET_QUERY,
            "Extract country, activity status and sector filters from a natural-language question.",
            object_schema(
                object_map(json!({
                    "question": { "type": "string", "description": "The question to interpret" }
                })),
                &["question"],
            ),
        ),
    ]
}
