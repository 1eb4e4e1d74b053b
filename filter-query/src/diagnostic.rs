/// A constraint the compiler dropped instead of failing.
///
/// Compilation is fail-open: every variant here means "this part of the
/// filter contributed nothing", never "the request is invalid".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Token split into fewer than three parts.
    MalformedExpressionShape { token: String, parts: usize },
    /// Three-part token whose operator keyword is not `eq|lt|lte|gt|gte`.
    UnknownOperator { token: String, operator: String },
    /// Comparison value that does not parse as a finite float.
    InvalidNumericLiteral { field: String, value: String },
    /// `true`/`false` literal that failed boolean parsing.
    InvalidBooleanLiteral { field: String, value: String },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::MalformedExpressionShape { .. } => "malformed_expression_shape",
            Diagnostic::UnknownOperator { .. } => "unknown_operator",
            Diagnostic::InvalidNumericLiteral { .. } => "invalid_numeric_literal",
            Diagnostic::InvalidBooleanLiteral { .. } => "invalid_boolean_literal",
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MalformedExpressionShape { token, parts } => write!(
                f,
                "Ignoring expression {:?}: expected at least 3 parts, found {}",
                token, parts
            ),
            Diagnostic::UnknownOperator { token, operator } => write!(
                f,
                "Ignoring expression {:?}: unknown operator {:?}",
                token, operator
            ),
            Diagnostic::InvalidNumericLiteral { field, value } => write!(
                f,
                "Dropping constraint on {}: {:?} is not a valid number",
                field, value
            ),
            Diagnostic::InvalidBooleanLiteral { field, value } => write!(
                f,
                "Dropping constraint on {}: {:?} is not a valid boolean",
                field, value
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}
