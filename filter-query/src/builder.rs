use super::diagnostic::Diagnostic;
use super::normalize::ValueNormalizer;
use super::predicate::{Predicate, OR_KEY};
use super::types::{Clause, Expression, Join, Operator};
use serde_json::Value;

/// Left-to-right fold of classified expressions into one [`Predicate`].
///
/// Top-level keys are overwritten, never merged. Only the OR-set of the most
/// recent multi-value expression survives, and it is attached last.
pub(crate) struct PredicateBuilder<'a> {
    normalizer: &'a ValueNormalizer,
    predicate: Predicate,
    or_set: Vec<Value>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> PredicateBuilder<'a> {
    pub(crate) fn new(normalizer: &'a ValueNormalizer) -> Self {
        Self {
            normalizer,
            predicate: Predicate::new(),
            or_set: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, expression: &Expression) {
        match expression {
            Expression::Simple {
                field,
                operator: Operator::Eq,
                value,
            } => {
                if let Some(value) = self.equality_value(field, value) {
                    self.predicate.insert(field.as_str(), value);
                }
            }
            Expression::Simple {
                field,
                operator,
                value,
            } => {
                if let Some(comparison) = self.comparison(field, *operator, value) {
                    self.predicate.merge(comparison);
                }
            }
            Expression::MultiValue { field, values } => {
                let or_set = values
                    .iter()
                    .filter_map(|value| {
                        self.equality_value(field, value)
                            .map(|value| Predicate::equals(field.as_str(), value).into_value())
                    })
                    .collect();
                self.or_set = or_set;
            }
            Expression::Joined {
                field,
                first,
                join,
                second,
            } => self.push_joined(field, first, *join, second),
        }
    }

    fn push_joined(&mut self, field: &str, first: &Clause, join: Join, second: &Clause) {
        let first = self.comparison(field, first.operator, &first.value);
        let second = self.comparison(field, second.operator, &second.value);
        // Both sides or nothing; a half-built group would change its meaning.
        if let (Some(first), Some(second)) = (first, second) {
            self.predicate.insert(
                join.store_key(),
                Value::Array(vec![first.into_value(), second.into_value()]),
            );
        }
    }

    fn equality_value(&mut self, field: &str, value: &str) -> Option<Value> {
        match self.normalizer.equality(field, value) {
            Ok(value) => Some(value),
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn comparison(&mut self, field: &str, operator: Operator, value: &str) -> Option<Predicate> {
        let number = match self.normalizer.numeric(field, value) {
            Ok(number) => number,
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                return None;
            }
        };
        Predicate::compare(field, operator, number)
    }

    pub(crate) fn finish(mut self) -> (Predicate, Vec<Diagnostic>) {
        if !self.or_set.is_empty() {
            self.predicate.insert(OR_KEY, Value::Array(self.or_set));
        }
        (self.predicate, self.diagnostics)
    }
}
