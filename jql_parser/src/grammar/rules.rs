//! Semantic legality tables checked while parsing
//!
//! | operator              | single | empty | list | function |
//! |-----------------------|--------|-------|------|----------|
//! | `=` `!=`              | yes    | yes   | no   | yes      |
//! | `~` `!~`              | yes    | yes   | yes  | yes      |
//! | `<` `<=` `>` `>=`     | yes    | no    | no   | yes      |
//! | `in` `not in`         | yes    | yes   | yes  | yes      |
//! | `is` `is not`         | no     | yes   | no   | no       |
//! | `was` `was not`       | yes    | yes   | no   | yes      |
//! | `was in` `was not in` | yes    | yes   | yes  | yes      |
//!
//! `changed` takes no operand. Only the history operators take
//! predicates; `from` and `to` are reserved to `changed`.

use super::ast::{Operand, Operator, PredicateKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    Single,
    Empty,
    List,
    Function,
}

impl OperandShape {
    pub fn of(operand: &Operand) -> Self {
        match operand {
            Operand::Single(Value::EmptyValue) => Self::Empty,
            Operand::Single(_) => Self::Single,
            Operand::Multi(_) => Self::List,
            Operand::Function { .. } => Self::Function,
        }
    }
}

/// Whether `operator` may be applied to an operand of `shape`
pub fn accepts_operand(operator: Operator, shape: OperandShape) -> bool {
    use OperandShape::*;
    use Operator::*;

    match operator {
        Equals | NotEquals | Was | WasNot => shape != List,
        Like | NotLike | In | NotIn | WasIn | WasNotIn => true,
        LessThan | LessThanEquals | GreaterThan | GreaterThanEquals => {
            matches!(shape, Single | Function)
        }
        Is | IsNot => shape == Empty,
        Changed => false,
    }
}

/// Whether `predicate` may follow a clause built with `operator`
pub fn accepts_predicate(operator: Operator, predicate: PredicateKind) -> bool {
    use PredicateKind::*;

    match operator {
        Operator::Was | Operator::WasNot | Operator::WasIn | Operator::WasNotIn => {
            matches!(predicate, After | Before | By | During | On)
        }
        Operator::Changed => predicate != Changed,
        _ => false,
    }
}

/// `during` takes a two-element range; every other predicate a single
/// value or a function call
pub fn accepts_predicate_operand(predicate: PredicateKind, operand: &Operand) -> bool {
    match predicate {
        PredicateKind::During => match operand {
            Operand::Multi(items) => {
                items.len() == 2 && items.iter().all(|item| !matches!(item, Operand::Multi(_)))
            }
            _ => false,
        },
        _ => !matches!(operand, Operand::Multi(_)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_shapes() {
        assert_eq!(OperandShape::of(&Operand::empty()), OperandShape::Empty);
        assert_eq!(OperandShape::of(&Operand::number(1)), OperandShape::Single);
        assert_eq!(OperandShape::of(&Operand::Multi(vec![])), OperandShape::List);
        assert_eq!(
            OperandShape::of(&Operand::function("now", vec![])),
            OperandShape::Function
        );
    }

    #[test]
    fn test_operator_operand_table() {
        assert!(!accepts_operand(Operator::Equals, OperandShape::List));
        assert!(accepts_operand(Operator::Equals, OperandShape::Empty));
        assert!(accepts_operand(Operator::Like, OperandShape::List));
        assert!(!accepts_operand(Operator::LessThan, OperandShape::Empty));
        assert!(accepts_operand(Operator::GreaterThanEquals, OperandShape::Function));
        assert!(accepts_operand(Operator::NotIn, OperandShape::List));
        assert!(accepts_operand(Operator::Is, OperandShape::Empty));
        assert!(!accepts_operand(Operator::IsNot, OperandShape::Single));
        assert!(!accepts_operand(Operator::IsNot, OperandShape::Function));
        assert!(!accepts_operand(Operator::WasNot, OperandShape::List));
        assert!(accepts_operand(Operator::WasIn, OperandShape::List));
        assert!(!accepts_operand(Operator::Changed, OperandShape::Single));
    }

    #[test]
    fn test_predicate_table() {
        assert!(accepts_predicate(Operator::Was, PredicateKind::During));
        assert!(!accepts_predicate(Operator::Was, PredicateKind::From));
        assert!(accepts_predicate(Operator::Changed, PredicateKind::To));
        assert!(!accepts_predicate(Operator::Equals, PredicateKind::After));
        assert!(!accepts_predicate(Operator::In, PredicateKind::By));
    }

    #[test]
    fn test_predicate_operands() {
        let range = Operand::Multi(vec![Operand::string("a"), Operand::function("now", vec![])]);
        assert!(accepts_predicate_operand(PredicateKind::During, &range));
        assert!(!accepts_predicate_operand(PredicateKind::During, &Operand::string("a")));
        assert!(!accepts_predicate_operand(
            PredicateKind::During,
            &Operand::Multi(vec![Operand::string("a")])
        ));
        assert!(!accepts_predicate_operand(PredicateKind::After, &range));
        assert!(accepts_predicate_operand(PredicateKind::By, &Operand::empty()));
    }
}
