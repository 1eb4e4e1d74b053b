use super::types::Operator;
use serde::Serialize;
use serde_json::{Map, Number, Value};

pub const AND_KEY: &str = "$and";
pub const OR_KEY: &str = "$or";

/// Document-store predicate: an insertion-ordered JSON object whose keys are
/// field names or the reserved `$and`/`$or` keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicate(Map<String, Value>);

impl Predicate {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// `{ field: value }`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut predicate = Self::new();
        predicate.insert(field, value);
        predicate
    }

    /// `{ field: { "$op": value } }`. Returns `None` for non-finite values,
    /// which JSON cannot represent.
    pub fn compare(field: impl Into<String>, operator: Operator, value: f64) -> Option<Self> {
        let number = Number::from_f64(value)?;
        let mut nested = Map::new();
        nested.insert(operator.store_key(), Value::Number(number));
        Some(Self::equals(field, Value::Object(nested)))
    }

    /// Combines predicates that must all hold. Empty predicates are skipped;
    /// a single remaining predicate is returned unchanged, several are nested
    /// under `$and` so none of their keys can clobber another's.
    pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::combine(AND_KEY, predicates)
    }

    /// Combines predicates of which at least one must hold.
    pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::combine(OR_KEY, predicates)
    }

    fn combine(key: &str, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts: Vec<Predicate> = predicates.into_iter().filter(|p| !p.is_empty()).collect();
        match parts.len() {
            0 => Self::new(),
            1 => parts.remove(0),
            _ => Self::equals(
                key,
                Value::Array(parts.into_iter().map(Value::from).collect()),
            ),
        }
    }

    /// Sets `key`, replacing whatever was there before.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Copies every key of `other` into `self`, last writer wins.
    pub fn merge(&mut self, other: Predicate) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Predicate> for Value {
    fn from(predicate: Predicate) -> Self {
        predicate.into_value()
    }
}

impl From<Map<String, Value>> for Predicate {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}
