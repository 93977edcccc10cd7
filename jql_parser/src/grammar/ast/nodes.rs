//! Query AST
//!
//! Trees are built bottom-up by the parser and never mutated afterwards.
//! Every node is serde-serializable so results can be handed to other
//! processes as JSON.

use serde::{Deserialize, Serialize};

// === QUERY ===

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// `None` matches everything
    pub clause: Option<Clause>,
    pub order_by: OrderBy,
    /// The text that was parsed
    pub raw_text: String,
}

impl Query {
    /// Same clause tree and ordering, ignoring the original text
    pub fn same_structure(&self, other: &Query) -> bool {
        self.clause == other.clause && self.order_by == other.order_by
    }
}

// === FIELDS ===

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    /// Field name, or the normalised `cf[N]` form for custom field ids
    pub name: String,
    pub is_custom_field_id: bool,
    /// `field[key].path` suffix
    pub property: Option<Property>,
}

impl FieldRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_custom_field_id: false,
            property: None,
        }
    }

    /// `cf[id]`
    pub fn custom_field(id: u64) -> Self {
        Self {
            name: format!("cf[{}]", id),
            is_custom_field_id: true,
            property: None,
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.property = Some(property);
        self
    }

    /// Numeric id of a custom field reference
    pub fn custom_field_id(&self) -> Option<u64> {
        if !self.is_custom_field_id {
            return None;
        }
        self.name
            .strip_prefix("cf[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|digits| digits.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    /// Dotted path after the key, split on `.`
    pub path: Vec<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            key: key.into(),
            path,
        }
    }
}

// === OPERATORS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    NotEquals,
    Like,
    NotLike,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    In,
    NotIn,
    Is,
    IsNot,
    Was,
    WasNot,
    WasIn,
    WasNotIn,
    Changed,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Like => "~",
            Self::NotLike => "!~",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::Was => "was",
            Self::WasNot => "was not",
            Self::WasIn => "was in",
            Self::WasNotIn => "was not in",
            Self::Changed => "changed",
        }
    }

    /// WAS family and CHANGED
    pub const fn is_history(self) -> bool {
        matches!(
            self,
            Self::Was | Self::WasNot | Self::WasIn | Self::WasNotIn | Self::Changed
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// === OPERANDS ===

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    StringLiteral(String),
    /// Range-checked signed 64-bit number
    NumberLiteral(i64),
    /// `EMPTY` / `NULL`
    EmptyValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Single(Value),
    /// Parenthesised list; items may themselves be lists or functions
    Multi(Vec<Operand>),
    Function {
        name: String,
        /// Decoded argument text, never further parsed
        args: Vec<String>,
    },
}

impl Operand {
    pub fn string(text: impl Into<String>) -> Self {
        Self::Single(Value::StringLiteral(text.into()))
    }

    pub fn number(value: i64) -> Self {
        Self::Single(Value::NumberLiteral(value))
    }

    pub fn empty() -> Self {
        Self::Single(Value::EmptyValue)
    }

    pub fn function(name: impl Into<String>, args: Vec<String>) -> Self {
        Self::Function {
            name: name.into(),
            args,
        }
    }

    pub fn is_empty_value(&self) -> bool {
        matches!(self, Self::Single(Value::EmptyValue))
    }
}

// === CLAUSES ===

/// Qualifiers that follow WAS/CHANGED clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateKind {
    /// `field CHANGED` itself; carries no operand
    Changed,
    After,
    Before,
    By,
    During,
    On,
    From,
    To,
}

impl PredicateKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::After => "after",
            Self::Before => "before",
            Self::By => "by",
            Self::During => "during",
            Self::On => "on",
            Self::From => "from",
            Self::To => "to",
        }
    }
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateTarget {
    Field(FieldRef),
    Clause(Box<Clause>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clause {
    Terminal {
        field: FieldRef,
        operator: Operator,
        operand: Operand,
    },
    And {
        children: Vec<Clause>,
    },
    Or {
        children: Vec<Clause>,
    },
    Not {
        inner: Box<Clause>,
    },
    Predicate {
        target: PredicateTarget,
        name: PredicateKind,
        operand: Option<Operand>,
    },
}

impl Clause {
    pub fn terminal(field: FieldRef, operator: Operator, operand: Operand) -> Self {
        Self::Terminal {
            field,
            operator,
            operand,
        }
    }

    pub fn not(inner: Clause) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    /// Wraps `children` in AND unless there is only one
    pub fn and(mut children: Vec<Clause>) -> Self {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        Self::And { children }
    }

    /// Wraps `children` in OR unless there is only one
    pub fn or(mut children: Vec<Clause>) -> Self {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        Self::Or { children }
    }

    /// Number of terminal and predicate leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Terminal { .. } | Self::Predicate { .. } => 1,
            Self::And { children } | Self::Or { children } => {
                children.iter().map(Clause::leaf_count).sum()
            }
            Self::Not { inner } => inner.leaf_count(),
        }
    }

    /// Field the leftmost leaf refers to
    pub fn first_field(&self) -> Option<&FieldRef> {
        match self {
            Self::Terminal { field, .. } => Some(field),
            Self::Predicate { target, .. } => match target {
                PredicateTarget::Field(field) => Some(field),
                PredicateTarget::Clause(clause) => clause.first_field(),
            },
            Self::And { children } | Self::Or { children } => {
                children.first().and_then(Clause::first_field)
            }
            Self::Not { inner } => inner.first_field(),
        }
    }
}

// === ORDERING ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSort {
    pub field: FieldRef,
    /// `None` leaves the direction to the field's natural order
    pub direction: Option<SortDirection>,
}

impl SearchSort {
    pub fn new(field: FieldRef, direction: Option<SortDirection>) -> Self {
        Self { field, direction }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderBy {
    /// No ORDER BY was written; use the default sort
    #[default]
    Default,
    Explicit(Vec<SearchSort>),
}

impl OrderBy {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn sorts(&self) -> &[SearchSort] {
        match self {
            Self::Default => &[],
            Self::Explicit(sorts) => sorts,
        }
    }
}
