use super::diagnostic::Diagnostic;
use super::normalize::ValueNormalizer;
use super::types::{Clause, Expression, Join, Operator};

/// Splits a filter string into expression tokens and tokens into parts.
/// There is no escaping: a separator inside a value always splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tokenizer {
    expression_separator: char,
    part_separator: char,
}

impl Tokenizer {
    pub(crate) fn new(expression_separator: char, part_separator: char) -> Self {
        Self {
            expression_separator,
            part_separator,
        }
    }

    pub(crate) fn tokens<'a>(&self, filter: &'a str) -> impl Iterator<Item = &'a str> {
        filter.split(self.expression_separator)
    }

    pub(crate) fn parts<'a>(&self, token: &'a str) -> Vec<&'a str> {
        token.split(self.part_separator).collect()
    }

    pub(crate) fn expression_separator(&self) -> char {
        self.expression_separator
    }

    pub(crate) fn part_separator(&self) -> char {
        self.part_separator
    }
}

/// Turns the parts of one token into an [`Expression`], or reports why the
/// token contributes nothing.
pub(crate) struct Classifier<'a> {
    normalizer: &'a ValueNormalizer,
    joined_expressions: bool,
}

impl<'a> Classifier<'a> {
    pub(crate) fn new(normalizer: &'a ValueNormalizer, joined_expressions: bool) -> Self {
        Self {
            normalizer,
            joined_expressions,
        }
    }

    pub(crate) fn classify(&self, token: &str, parts: &[&str]) -> Result<Expression, Diagnostic> {
        if parts.len() < 3 {
            return Err(Diagnostic::MalformedExpressionShape {
                token: token.to_string(),
                parts: parts.len(),
            });
        }

        let field = parts[0].to_lowercase();

        if parts.len() == 3 {
            let operator =
                Operator::from_keyword(parts[1]).ok_or_else(|| Diagnostic::UnknownOperator {
                    token: token.to_string(),
                    operator: parts[1].to_string(),
                })?;
            return Ok(Expression::Simple {
                field,
                operator,
                value: self.normalizer.substitute(parts[2]),
            });
        }

        if self.joined_expressions {
            if let Some(joined) = self.classify_joined(&field, parts) {
                return Ok(joined);
            }
        }

        // The stated operator is ignored for multi-value tokens.
        Ok(Expression::MultiValue {
            field,
            values: parts[2..]
                .iter()
                .map(|value| self.normalizer.substitute(value))
                .collect(),
        })
    }

    /// `field_op_value_join_op2_value2`; anything else falls back to the
    /// multi-value reading of the token.
    fn classify_joined(&self, field: &str, parts: &[&str]) -> Option<Expression> {
        if parts.len() != 6 {
            return None;
        }
        let operator = Operator::from_keyword(parts[1])?;
        let join = Join::from_keyword(parts[3])?;
        let operator2 = Operator::from_keyword(parts[4])?;
        Some(Expression::Joined {
            field: field.to_string(),
            first: Clause::new(operator, self.normalizer.substitute(parts[2])),
            join,
            second: Clause::new(operator2, self.normalizer.substitute(parts[5])),
        })
    }
}
