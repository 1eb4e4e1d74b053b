use regex::RegexBuilder;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluates a predicate object against one document.
///
/// Supported: literal equality, `$eq`, `$lt`, `$lte`, `$gt`, `$gte`, `$in`,
/// `$regex` (with `$options`), and the `$and`/`$or` combinators. Unknown
/// operators never match.
pub fn matches(document: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$and" => {
            sub_filters(condition).map_or(false, |mut subs| subs.all(|f| matches(document, f)))
        }
        "$or" => {
            sub_filters(condition).map_or(false, |mut subs| subs.any(|f| matches(document, f)))
        }
        _ => field_matches(lookup(document, key), condition),
    })
}

fn sub_filters(condition: &Value) -> Option<impl Iterator<Item = &Map<String, Value>>> {
    let array = condition.as_array()?;
    Some(array.iter().filter_map(Value::as_object))
}

/// Resolves a dotted path such as `traits.hat` inside nested objects.
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(path) {
        return Some(value);
    }
    let (first, rest) = path.split_once('.')?;
    lookup(document.get(first)?, rest)
}

fn is_operator_object(condition: &Value) -> Option<&Map<String, Value>> {
    let ops = condition.as_object()?;
    if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) {
        Some(ops)
    } else {
        None
    }
}

fn field_matches(value: Option<&Value>, condition: &Value) -> bool {
    match is_operator_object(condition) {
        Some(ops) => ops
            .iter()
            .all(|(op, operand)| operator_matches(value, op, operand, ops)),
        None => value.map_or(false, |v| equals_or_contains(v, condition)),
    }
}

fn operator_matches(
    value: Option<&Value>,
    op: &str,
    operand: &Value,
    ops: &Map<String, Value>,
) -> bool {
    // Only consulted together with `$regex`.
    if op == "$options" {
        return true;
    }
    let Some(value) = value else {
        return false;
    };

    match op {
        "$eq" => equals_or_contains(value, operand),
        "$lt" => compare(value, operand) == Some(Ordering::Less),
        "$lte" => matches!(compare(value, operand), Some(Ordering::Less | Ordering::Equal)),
        "$gt" => compare(value, operand) == Some(Ordering::Greater),
        "$gte" => matches!(
            compare(value, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "$in" => operand
            .as_array()
            .map_or(false, |candidates| {
                candidates.iter().any(|c| equals_or_contains(value, c))
            }),
        "$regex" => {
            let options = ops.get("$options").and_then(Value::as_str).unwrap_or("");
            regex_matches(value, operand, options)
        }
        _ => {
            tracing::debug!("Unsupported filter operator: {}", op);
            false
        }
    }
}

fn regex_matches(value: &Value, pattern: &Value, options: &str) -> bool {
    let (Some(text), Some(pattern)) = (value.as_str(), pattern.as_str()) else {
        return false;
    };
    match RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .build()
    {
        Ok(re) => re.is_match(text),
        Err(e) => {
            tracing::debug!("Invalid $regex pattern {:?}: {}", pattern, e);
            false
        }
    }
}

/// Array-valued fields match when any element matches.
fn equals_or_contains(value: &Value, expected: &Value) -> bool {
    if values_equal(value, expected) {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering for comparison operators: numbers against numbers, strings
/// against strings. Mixed types are not comparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order used for sorting: missing and null first, then numbers,
/// strings, objects, arrays, booleans.
pub fn compare_for_sort(a: &Value, b: &Value, field: &str) -> Ordering {
    let (a, b) = (lookup(a, field), lookup(b, field));
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
