//! Sorting and paging for list reads.

use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::Value;

/// Sort direction. Ascending unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Options accepted by `get_all` and the related-record reads.
///
/// Unknown keys in a deserialized options object are ignored rather than
/// rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// 1-based page number; only effective together with `page_size`
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Applies sort and paging to decoded records.
pub fn apply_options(mut records: Vec<Value>, options: &ListOptions) -> Vec<Value> {
    if let Some(sort_by) = &options.sort_by {
        records.sort_by(|a, b| compare_values(a.get(sort_by), b.get(sort_by)));
        if options.sort_order == SortOrder::Desc {
            records.reverse();
        }
    }

    match (options.page, options.page_size) {
        (Some(page), Some(page_size)) if page_size > 0 => {
            let start = page.saturating_sub(1).saturating_mul(page_size);
            records.into_iter().skip(start).take(page_size).collect()
        }
        _ => records,
    }
}

/// Typed comparison: numbers numerically, text lexicographically (RFC 3339
/// dates sort chronologically this way), false before true, absent first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => json_rank(x).cmp(&json_rank(y)),
    }
}

fn json_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
