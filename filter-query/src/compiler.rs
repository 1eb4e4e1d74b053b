use super::builder::PredicateBuilder;
use super::diagnostic::Diagnostic;
use super::normalize::{LiteralSubstitutions, ValueNormalizer};
use super::parser::{Classifier, Tokenizer};
use super::predicate::Predicate;
use super::types::Expression;

/// Separates independent expressions: `a_eq_1;b_gt_2`.
pub const EXPRESSION_SEPARATOR: char = ';';
/// Separates the parts of one expression: `field_op_value`.
pub const PART_SEPARATOR: char = '_';

lazy_static::lazy_static! {
    static ref DEFAULT_COMPILER: FilterCompiler = FilterCompiler::default();
}

/// Compiles `filter` with the default separators and substitution table.
pub fn compile(filter: &str) -> Predicate {
    DEFAULT_COMPILER.compile(filter)
}

/// Like [`compile`], also returning the constraints that were dropped.
pub fn compile_with_diagnostics(filter: &str) -> Compiled {
    DEFAULT_COMPILER.compile_with_diagnostics(filter)
}

/// Predicate plus everything that was dropped while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compiled {
    pub predicate: Predicate,
    pub diagnostics: Vec<Diagnostic>,
}

/// Immutable compiler configuration; safe to share across requests.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    tokenizer: Tokenizer,
    normalizer: ValueNormalizer,
    joined_expressions: bool,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::new(EXPRESSION_SEPARATOR, PART_SEPARATOR),
            normalizer: ValueNormalizer::default(),
            joined_expressions: false,
        }
    }
}

impl FilterCompiler {
    pub fn builder() -> FilterCompilerBuilder {
        FilterCompilerBuilder::default()
    }

    pub fn expression_separator(&self) -> char {
        self.tokenizer.expression_separator()
    }

    pub fn part_separator(&self) -> char {
        self.tokenizer.part_separator()
    }

    pub fn joined_expressions(&self) -> bool {
        self.joined_expressions
    }

    /// Classifies every token in order. Tokens that contribute nothing are
    /// reported as diagnostics instead of expressions.
    pub fn parse(&self, filter: &str) -> (Vec<Expression>, Vec<Diagnostic>) {
        let classifier = Classifier::new(&self.normalizer, self.joined_expressions);
        let mut expressions = Vec::new();
        let mut diagnostics = Vec::new();

        for token in self.tokenizer.tokens(filter) {
            let parts = self.tokenizer.parts(token);
            match classifier.classify(token, &parts) {
                Ok(expression) => expressions.push(expression),
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        (expressions, diagnostics)
    }

    pub fn compile(&self, filter: &str) -> Predicate {
        self.compile_with_diagnostics(filter).predicate
    }

    pub fn compile_with_diagnostics(&self, filter: &str) -> Compiled {
        let (expressions, mut diagnostics) = self.parse(filter);

        let mut builder = PredicateBuilder::new(&self.normalizer);
        for expression in &expressions {
            builder.push(expression);
        }
        let (predicate, build_diagnostics) = builder.finish();
        diagnostics.extend(build_diagnostics);

        for diagnostic in &diagnostics {
            tracing::debug!(kind = diagnostic.kind(), "{}", diagnostic);
        }

        Compiled {
            predicate,
            diagnostics,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterCompilerBuilder {
    expression_separator: char,
    part_separator: char,
    substitutions: LiteralSubstitutions,
    joined_expressions: bool,
}

impl Default for FilterCompilerBuilder {
    fn default() -> Self {
        Self {
            expression_separator: EXPRESSION_SEPARATOR,
            part_separator: PART_SEPARATOR,
            substitutions: LiteralSubstitutions::default(),
            joined_expressions: false,
        }
    }
}

impl FilterCompilerBuilder {
    pub fn expression_separator(mut self, separator: char) -> Self {
        self.expression_separator = separator;
        self
    }

    pub fn part_separator(mut self, separator: char) -> Self {
        self.part_separator = separator;
        self
    }

    /// Replaces the whole substitution table.
    pub fn substitutions(mut self, substitutions: LiteralSubstitutions) -> Self {
        self.substitutions = substitutions;
        self
    }

    /// Adds one entry to the substitution table.
    pub fn substitution(mut self, raw: impl Into<String>, normalized: impl Into<String>) -> Self {
        self.substitutions = self.substitutions.with(raw, normalized);
        self
    }

    /// Enables `field_op_value_and|or_op2_value2` tokens. Off by default, in
    /// which case six-part tokens are read as multi-value expressions.
    pub fn joined_expressions(mut self, enabled: bool) -> Self {
        self.joined_expressions = enabled;
        self
    }

    pub fn build(self) -> anyhow::Result<FilterCompiler> {
        if self.expression_separator == self.part_separator {
            anyhow::bail!(
                "Expression and part separators must differ, both are {:?}",
                self.part_separator
            );
        }
        Ok(FilterCompiler {
            tokenizer: Tokenizer::new(self.expression_separator, self.part_separator),
            normalizer: ValueNormalizer::new(self.substitutions),
            joined_expressions: self.joined_expressions,
        })
    }
}
