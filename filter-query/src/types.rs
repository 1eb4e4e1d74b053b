/// AST types for the filter syntax

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,  // field_eq_value
    Lt,  // field_lt_value
    Lte, // field_lte_value
    Gt,  // field_gt_value
    Gte, // field_gte_value
}

impl Operator {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "eq" => Some(Operator::Eq),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
        }
    }

    /// Key used for this operator inside a nested comparison object, e.g. `$gte`.
    pub fn store_key(&self) -> String {
        format!("${}", self.keyword())
    }

    pub fn is_comparison(&self) -> bool {
        !matches!(self, Operator::Eq)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    And,
    Or,
}

impl Join {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Join::And),
            "or" => Some(Join::Or),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Join::And => "and",
            Join::Or => "or",
        }
    }

    /// Reserved top-level predicate key, `$and` or `$or`.
    pub fn store_key(&self) -> String {
        format!("${}", self.keyword())
    }
}

impl std::fmt::Display for Join {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One side of a joined expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub operator: Operator,
    pub value: String,
}

impl Clause {
    pub fn new(operator: Operator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }
}

/// A classified filter token. Values have already gone through literal
/// substitution; type coercion happens when the predicate is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `field_op_value`
    Simple {
        field: String,
        operator: Operator,
        value: String,
    },
    /// `field_op_v1_v2...`, the operator is discarded and every value becomes
    /// an equality alternative.
    MultiValue { field: String, values: Vec<String> },
    /// `field_op_value_join_op2_value2`, only produced when joined expressions
    /// are enabled on the compiler.
    Joined {
        field: String,
        first: Clause,
        join: Join,
        second: Clause,
    },
}

impl Expression {
    pub fn field(&self) -> &str {
        match self {
            Expression::Simple { field, .. }
            | Expression::MultiValue { field, .. }
            | Expression::Joined { field, .. } => field,
        }
    }
}
