//! Canonical query text
//!
//! `Display` on the AST writes JQL that parses back to an equal tree.
//! Keywords are upper-case, operators lower-case, and strings are quoted
//! only when written bare they would mean something else.

use super::nodes::*;
use crate::grammar::keywords::{classify_word_type, WordType, DURING};
use crate::lexical::{is_illegal_character, is_word_break};
use std::fmt::{self, Display, Formatter, Write};

/// `text` as a bare word when that tokenizes back to the same string,
/// otherwise double-quoted with escapes
pub fn quote_if_needed(text: &str) -> String {
    if can_write_bare(text) {
        text.to_string()
    } else {
        quote(text)
    }
}

fn can_write_bare(text: &str) -> bool {
    !text.is_empty()
        && classify_word_type(text) == WordType::Plain
        && !text.eq_ignore_ascii_case(DURING)
        && text
            .chars()
            .all(|ch| ch != '\\' && !is_word_break(ch) && !is_illegal_character(ch, false))
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if is_illegal_character(c, true) && (c as u32) <= 0xFFFF => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::StringLiteral(text) => f.write_str(&quote_if_needed(text)),
            Value::NumberLiteral(number) => write!(f, "{}", number),
            Value::EmptyValue => f.write_str("EMPTY"),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Single(value) => value.fmt(f),
            Operand::Multi(items) => {
                f.write_str("(")?;
                write_joined(f, items, ", ")?;
                f.write_str(")")
            }
            Operand::Function { name, args } => {
                write!(f, "{}(", quote_if_needed(name))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&quote_if_needed(arg))?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", quote_if_needed(&self.key))?;
        if !self.path.is_empty() {
            let path = format!(".{}", self.path.join("."));
            f.write_str(&quote_if_needed(&path))?;
        }
        Ok(())
    }
}

impl Display for FieldRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.custom_field_id() {
            Some(id) => write!(f, "cf[{}]", id)?,
            None => f.write_str(&quote_if_needed(&self.name))?,
        }
        if let Some(property) = &self.property {
            property.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for SearchSort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.field.fmt(f)?;
        if let Some(direction) = self.direction {
            write!(f, " {}", direction)?;
        }
        Ok(())
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Explicit(sorts) if !sorts.is_empty() => {
                f.write_str("ORDER BY ")?;
                write_joined(f, sorts, ", ")
            }
            _ => Ok(()),
        }
    }
}

/// Binding strength, loosest first
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    Not,
    Leaf,
}

fn precedence(clause: &Clause) -> Precedence {
    match clause {
        Clause::Or { .. } => Precedence::Or,
        Clause::And { .. } => Precedence::And,
        Clause::Not { .. } => Precedence::Not,
        Clause::Terminal { .. } | Clause::Predicate { .. } => Precedence::Leaf,
    }
}

/// Children at or below the parent's strength need parentheses, except
/// NOT inside NOT, which needs none.
fn write_child(f: &mut Formatter<'_>, child: &Clause, parent: Precedence) -> fmt::Result {
    let own = precedence(child);
    if own > parent || (own == Precedence::Not && parent == Precedence::Not) {
        child.fmt(f)
    } else {
        write!(f, "({})", child)
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Terminal {
                field,
                operator,
                operand,
            } => write!(f, "{} {} {}", field, operator, operand),
            Clause::And { children } => write_children(f, children, " AND ", Precedence::And),
            Clause::Or { children } => write_children(f, children, " OR ", Precedence::Or),
            Clause::Not { inner } => {
                f.write_str("NOT ")?;
                write_child(f, inner, Precedence::Not)
            }
            Clause::Predicate {
                target,
                name,
                operand,
            } => {
                match target {
                    PredicateTarget::Field(field) => field.fmt(f)?,
                    PredicateTarget::Clause(clause) => clause.fmt(f)?,
                }
                write!(f, " {}", name)?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                Ok(())
            }
        }
    }
}

fn write_children(
    f: &mut Formatter<'_>,
    children: &[Clause],
    separator: &str,
    parent: Precedence,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_child(f, child, parent)?;
    }
    Ok(())
}

fn write_joined<T: Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.clause, self.order_by.sorts().is_empty()) {
            (Some(clause), true) => clause.fmt(f),
            (Some(clause), false) => write!(f, "{} {}", clause, self.order_by),
            (None, _) => self.order_by.fmt(f),
        }
    }
}
