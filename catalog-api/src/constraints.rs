//! Builds the store filter for a request from its independent constraints.

use crate::config::ApiConfig;
use crate::handlers::DocumentQuery;
use filter_query::Predicate;
use serde_json::{json, Value};

/// Combines the compiled `filter`, the `ids` list and the free-text `search`.
/// Each constraint is built on its own; several are nested under `$and` so
/// that, for instance, a `$or` from the filter and one from the search never
/// overwrite each other.
pub fn build_filter(params: &DocumentQuery, config: &ApiConfig) -> Predicate {
    let mut constraints = Vec::new();

    // Blank filters are skipped, others compile exactly as received.
    if let Some(filter) = params.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        let compiled = filter_query::compile_with_diagnostics(filter);
        if !compiled.diagnostics.is_empty() {
            tracing::warn!(
                filter = %filter,
                dropped = compiled.diagnostics.len(),
                "filter compiled with dropped constraints"
            );
        }
        constraints.push(compiled.predicate);
    }
    if let Some(ids) = non_empty(params.ids.as_deref()) {
        constraints.extend(ids_predicate(ids, &config.id_field));
    }
    if let Some(search) = non_empty(params.search.as_deref()) {
        constraints.extend(search_predicate(search, &config.searchable_fields));
    }

    Predicate::all_of(constraints)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `{ id_field: { "$in": [...] } }` from a comma-separated id list. Integer
/// ids are sent as numbers, anything else as strings.
pub fn ids_predicate(ids: &str, id_field: &str) -> Option<Predicate> {
    let ids: Vec<Value> = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| match id.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(id),
        })
        .collect();

    if ids.is_empty() {
        return None;
    }
    Some(Predicate::equals(id_field, json!({ "$in": ids })))
}

/// Case-insensitive substring match against any of `fields`. The search text
/// is matched literally, never as a pattern.
pub fn search_predicate(search: &str, fields: &[String]) -> Option<Predicate> {
    let pattern = regex::escape(search);
    let predicate = Predicate::any_of(fields.iter().map(|field| {
        Predicate::equals(
            field.as_str(),
            json!({ "$regex": pattern, "$options": "i" }),
        )
    }));
    if predicate.is_empty() {
        None
    } else {
        Some(predicate)
    }
}
