use super::diagnostic::Diagnostic;
use serde_json::Value;
use std::collections::HashMap;

/// Raw literals that collide with the `and` join keyword, mapped to the value
/// actually stored in the collection.
const DEFAULT_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("Bow and Arrow", "Bow & Arrow"),
    ("Bow Tie and Suit", "Bow Tie & Suit"),
    ("Suit and Tie", "Suit & Tie"),
    ("Tennis Socks and Shoes", "Tennis Socks & Shoes"),
];

/// Exact-match lookup table applied to raw values before any coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSubstitutions {
    table: HashMap<String, String>,
}

impl Default for LiteralSubstitutions {
    fn default() -> Self {
        DEFAULT_SUBSTITUTIONS
            .iter()
            .fold(Self::empty(), |table, (raw, normalized)| {
                table.with(*raw, *normalized)
            })
    }
}

impl LiteralSubstitutions {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn with(mut self, raw: impl Into<String>, normalized: impl Into<String>) -> Self {
        self.table.insert(raw.into(), normalized.into());
        self
    }

    /// Returns the normalized literal for `raw`, or `raw` itself when the
    /// table has no entry for it.
    pub fn apply<'a>(&'a self, raw: &'a str) -> &'a str {
        self.table.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueNormalizer {
    substitutions: LiteralSubstitutions,
}

impl ValueNormalizer {
    pub fn new(substitutions: LiteralSubstitutions) -> Self {
        Self { substitutions }
    }

    pub fn substitute(&self, raw: &str) -> String {
        self.substitutions.apply(raw).to_string()
    }

    /// Coerces a value used with `eq`: exact `true`/`false` become booleans,
    /// everything else stays a string.
    pub fn equality(&self, field: &str, value: &str) -> Result<Value, Diagnostic> {
        if value == "true" || value == "false" {
            value
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| Diagnostic::InvalidBooleanLiteral {
                    field: field.to_string(),
                    value: value.to_string(),
                })
        } else {
            Ok(Value::String(value.to_string()))
        }
    }

    /// Coerces a value used with `lt|lte|gt|gte` (or inside a joined clause).
    pub fn numeric(&self, field: &str, value: &str) -> Result<f64, Diagnostic> {
        value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| Diagnostic::InvalidNumericLiteral {
                field: field.to_string(),
                value: value.to_string(),
            })
    }
}
