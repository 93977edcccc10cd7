//! Recursive-descent parser over a token stream
//!
//! ```text
//! query      := [ or ] [ ORDER BY sort ( "," sort )* ] EOF
//! or         := and ( ( OR | "|" ) and )*
//! and        := not ( [ AND | "&" ] not )*
//! not        := ( NOT | "!" ) not | primary
//! primary    := "(" or ")" | terminal
//! terminal   := field operator operand predicate* | field CHANGED predicate*
//! field      := cf "[" digits "]" [ property ] | word [ property ]
//! property   := "[" word "]" [ ".path" ]
//! operand    := EMPTY | NULL | word | "(" operand ( "," operand )* ")" | word "(" args ")"
//! ```
//!
//! Parsing stops at the first error. When the offending token is the
//! tokenizer's `Error` token or a reserved word, that fault is reported
//! instead of the grammar error.

use super::{ParsedQuery, SyntaxResult};
use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::grammar::ast::*;
use crate::grammar::keywords::{Keyword, DURING};
use crate::grammar::rules::{self, OperandShape};
use crate::messages::{factory, ParseErrorMessage};
use crate::tokens::{StringStyle, Token, TokenKind, TokenStream};

pub struct Grammar {
    tokens: TokenStream,
    depth: usize,
    max_depth: usize,
}

impl Grammar {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_max_depth(tokens, MAX_PARSE_DEPTH)
    }

    pub fn with_max_depth(tokens: TokenStream, max_depth: usize) -> Self {
        Self {
            tokens,
            depth: 0,
            max_depth,
        }
    }

    // === ENTRY POINTS ===

    /// A complete query: optional clause, optional ORDER BY, then end of input
    pub fn query(&mut self) -> SyntaxResult<ParsedQuery> {
        let clause = if self.tokens.is_at_end() || self.current().is_keyword(Keyword::Order) {
            None
        } else {
            Some(self.or_clause()?)
        };

        let order_by = if self.current().is_keyword(Keyword::Order) {
            Some(self.order_by()?)
        } else {
            None
        };

        if !self.tokens.is_at_end() {
            return Err(self.fail(factory::need_logical_operator));
        }
        Ok(ParsedQuery { clause, order_by })
    }

    /// A single unquoted field reference and nothing else
    pub fn field_check(&mut self) -> SyntaxResult<FieldRef> {
        self.require_plain_words()?;
        let field = self.field()?;
        self.expect_end()?;
        Ok(field)
    }

    /// A single unquoted function name and nothing else
    pub fn function_name_check(&mut self) -> SyntaxResult<String> {
        self.require_plain_words()?;
        if !self.current().is_word() {
            return Err(self.fail(factory::generic_parse_error_token));
        }
        let name = self.tokens.advance().text;
        self.expect_end()?;
        Ok(name)
    }

    /// A single unquoted function argument and nothing else
    pub fn argument_check(&mut self) -> SyntaxResult<String> {
        self.require_plain_words()?;
        let argument = self.argument()?;
        self.expect_end()?;
        Ok(argument)
    }

    /// A single unquoted operand value and nothing else
    pub fn value_check(&mut self) -> SyntaxResult<Value> {
        self.require_plain_words()?;
        if !self.current().is_word() {
            return Err(self.fail(factory::generic_parse_error_token));
        }
        let token = self.tokens.advance();
        let value = value_of(&token)?;
        self.expect_end()?;
        Ok(value)
    }

    // === HELPERS ===

    fn current(&self) -> &Token {
        self.tokens.current()
    }

    /// Error at the current token. Lexical faults and reserved words
    /// take precedence over whatever `build` would report.
    fn fail(&self, build: impl FnOnce(&Token) -> ParseErrorMessage) -> ParseErrorMessage {
        let token = self.current();
        match &token.kind {
            TokenKind::Error(error) => factory::from_lexer_error(error),
            TokenKind::Reserved => factory::reserved_word(&token.text, token.line(), token.column()),
            _ => build(token),
        }
    }

    fn expect(&mut self, kind: &TokenKind, text: &str) -> SyntaxResult<()> {
        if self.tokens.advance_if(kind) {
            Ok(())
        } else {
            Err(self.fail(|token| factory::expected_text(token, text)))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, text: &str) -> SyntaxResult<()> {
        if self.current().is_keyword(keyword) {
            self.tokens.advance();
            Ok(())
        } else {
            Err(self.fail(|token| factory::expected_text(token, text)))
        }
    }

    fn expect_end(&self) -> SyntaxResult<()> {
        if self.tokens.is_at_end() {
            Ok(())
        } else {
            Err(self.fail(factory::generic_parse_error_token))
        }
    }

    /// Narrow entries accept only words that need no quoting
    fn require_plain_words(&self) -> SyntaxResult<()> {
        let quoted = self.tokens.all_tokens().iter().find(|token| {
            matches!(
                token.kind,
                TokenKind::Str(StringStyle::Quoted) | TokenKind::Str(StringStyle::Escaped)
            )
        });
        match quoted {
            Some(token) => Err(factory::generic_parse_error_token(token)),
            None => Ok(()),
        }
    }

    /// Run `production` one nesting level deeper
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<T> {
        if self.depth >= self.max_depth {
            let max_depth = self.max_depth;
            return Err(self.fail(|token| factory::too_deeply_nested(token, max_depth)));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    // === CLAUSES ===

    fn or_clause(&mut self) -> SyntaxResult<Clause> {
        let mut children = vec![self.and_clause()?];
        while self.current().is_keyword(Keyword::Or) || self.tokens.check(&TokenKind::Pipe) {
            self.tokens.advance();
            children.push(self.and_clause()?);
        }
        Ok(Clause::or(children))
    }

    fn and_clause(&mut self) -> SyntaxResult<Clause> {
        let mut children = vec![self.not_clause()?];
        loop {
            if self.current().is_keyword(Keyword::And) || self.tokens.check(&TokenKind::Amp) {
                self.tokens.advance();
                children.push(self.not_clause()?);
            } else if self.starts_clause() {
                // Adjacent clauses are joined by an implicit AND
                children.push(self.not_clause()?);
            } else {
                break;
            }
        }
        Ok(Clause::and(children))
    }

    fn starts_clause(&self) -> bool {
        let token = self.current();
        match &token.kind {
            TokenKind::Str(_)
            | TokenKind::Number
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Bang => true,
            TokenKind::Keyword(keyword) => matches!(keyword, Keyword::Not | Keyword::Cf),
            _ => false,
        }
    }

    fn not_clause(&mut self) -> SyntaxResult<Clause> {
        if self.current().is_keyword(Keyword::Not) || self.tokens.check(&TokenKind::Bang) {
            self.tokens.advance();
            let inner = self.nested(|grammar| grammar.not_clause())?;
            return Ok(Clause::not(inner));
        }
        self.primary_clause()
    }

    fn primary_clause(&mut self) -> SyntaxResult<Clause> {
        if self.tokens.check(&TokenKind::LParen) {
            return self.nested(|grammar| {
                grammar.tokens.advance();
                let clause = grammar.or_clause()?;
                grammar.expect(&TokenKind::RParen, ")")?;
                Ok(clause)
            });
        }
        self.terminal_clause()
    }

    fn terminal_clause(&mut self) -> SyntaxResult<Clause> {
        let field = self.field()?;
        let operator = self.operator()?;

        if operator == Operator::Changed {
            let changed = Clause::Predicate {
                target: PredicateTarget::Field(field),
                name: PredicateKind::Changed,
                operand: None,
            };
            return self.predicates(changed, operator);
        }

        let operand = self.operand()?;
        if !rules::accepts_operand(operator, OperandShape::of(&operand)) {
            return Err(factory::unsupported_operand(
                operator.as_str(),
                &operand.to_string(),
            ));
        }
        self.predicates(Clause::terminal(field, operator, operand), operator)
    }

    /// History predicates; each one wraps the clause built so far
    fn predicates(&mut self, mut clause: Clause, operator: Operator) -> SyntaxResult<Clause> {
        while let Some(predicate) = self.predicate_kind(operator) {
            if !rules::accepts_predicate(operator, predicate) {
                return Err(factory::unsupported_predicate(
                    predicate.as_str(),
                    operator.as_str(),
                ));
            }
            self.tokens.advance();

            let operand = self.operand()?;
            if !rules::accepts_predicate_operand(predicate, &operand) {
                return Err(factory::unsupported_operand(
                    predicate.as_str(),
                    &operand.to_string(),
                ));
            }
            clause = Clause::Predicate {
                target: PredicateTarget::Clause(Box::new(clause)),
                name: predicate,
                operand: Some(operand),
            };
        }
        Ok(clause)
    }

    /// `during` is an ordinary word unless it follows a history clause
    fn predicate_kind(&self, operator: Operator) -> Option<PredicateKind> {
        let token = self.current();
        match token.keyword() {
            Some(Keyword::After) => Some(PredicateKind::After),
            Some(Keyword::Before) => Some(PredicateKind::Before),
            Some(Keyword::By) => Some(PredicateKind::By),
            Some(Keyword::On) => Some(PredicateKind::On),
            Some(Keyword::From) => Some(PredicateKind::From),
            Some(Keyword::To) => Some(PredicateKind::To),
            _ if operator.is_history()
                && token.kind == TokenKind::Str(StringStyle::Plain)
                && token.text.eq_ignore_ascii_case(DURING) =>
            {
                Some(PredicateKind::During)
            }
            _ => None,
        }
    }

    // === FIELDS ===

    fn field(&mut self) -> SyntaxResult<FieldRef> {
        let token = self.current();
        let mut field = match token.kind {
            TokenKind::Keyword(Keyword::Cf) => {
                self.tokens.advance();
                self.custom_field()?
            }
            TokenKind::Str(_) | TokenKind::Number => {
                if token.text.trim().is_empty() {
                    return Err(factory::empty_field_name(token.line(), token.column()));
                }
                FieldRef::named(self.tokens.advance().text)
            }
            _ => return Err(self.fail(factory::bad_field_name)),
        };

        if self.tokens.check(&TokenKind::LBracket) {
            field.property = Some(self.property()?);
        }
        Ok(field)
    }

    /// `[digits]` after `cf`, normalised to `cf[N]`
    fn custom_field(&mut self) -> SyntaxResult<FieldRef> {
        self.expect(&TokenKind::LBracket, "[")?;

        let token = self.current();
        if token.kind != TokenKind::Number || token.text.starts_with('-') {
            return Err(self.fail(factory::bad_custom_field_id));
        }
        let id = token
            .text
            .parse::<u64>()
            .ok()
            .filter(|id| i64::try_from(*id).is_ok())
            .ok_or_else(|| factory::illegal_number(&token.text, token.line(), token.column()))?;
        self.tokens.advance();

        self.expect(&TokenKind::RBracket, "]")?;
        Ok(FieldRef::custom_field(id))
    }

    /// `[key]` with an optional `.dotted.path` word after it
    fn property(&mut self) -> SyntaxResult<Property> {
        self.tokens.advance();

        let token = self.current();
        if !token.is_word() || token.text.is_empty() {
            return Err(self.fail(factory::bad_property_argument));
        }
        let key = self.tokens.advance().text;
        self.expect(&TokenKind::RBracket, "]")?;

        let mut path = Vec::new();
        let next = self.current();
        if matches!(next.kind, TokenKind::Str(_)) && next.text.starts_with('.') {
            let token = self.tokens.advance();
            let segments: Vec<&str> = token.text.split('.').skip(1).collect();
            if segments.iter().any(|segment| segment.is_empty()) {
                return Err(factory::bad_property_argument(&token));
            }
            path = segments.into_iter().map(String::from).collect();
        }
        Ok(Property::new(key, path))
    }

    // === OPERATORS ===

    fn operator(&mut self) -> SyntaxResult<Operator> {
        let symbol = match self.current().kind {
            TokenKind::Equals => Some(Operator::Equals),
            TokenKind::NotEquals => Some(Operator::NotEquals),
            TokenKind::Like => Some(Operator::Like),
            TokenKind::NotLike => Some(Operator::NotLike),
            TokenKind::LessThan => Some(Operator::LessThan),
            TokenKind::LessThanOrEqual => Some(Operator::LessThanEquals),
            TokenKind::GreaterThan => Some(Operator::GreaterThan),
            TokenKind::GreaterThanOrEqual => Some(Operator::GreaterThanEquals),
            _ => None,
        };
        if let Some(operator) = symbol {
            self.tokens.advance();
            return Ok(operator);
        }

        let Some(keyword) = self.current().keyword() else {
            return Err(self.fail(factory::bad_operator));
        };
        match keyword {
            Keyword::In => {
                self.tokens.advance();
                Ok(Operator::In)
            }
            Keyword::Not => {
                self.tokens.advance();
                self.expect_keyword(Keyword::In, "IN")?;
                Ok(Operator::NotIn)
            }
            Keyword::Is => {
                self.tokens.advance();
                if self.current().is_keyword(Keyword::Not) {
                    self.tokens.advance();
                    Ok(Operator::IsNot)
                } else if self.tokens.check(&TokenKind::Bang) {
                    Err(self.fail(|token| factory::expected_text(token, "NOT")))
                } else {
                    Ok(Operator::Is)
                }
            }
            Keyword::Was => {
                self.tokens.advance();
                let negated = self.advance_if_keyword(Keyword::Not);
                let in_list = self.advance_if_keyword(Keyword::In);
                Ok(match (negated, in_list) {
                    (false, false) => Operator::Was,
                    (true, false) => Operator::WasNot,
                    (false, true) => Operator::WasIn,
                    (true, true) => Operator::WasNotIn,
                })
            }
            Keyword::Changed => {
                self.tokens.advance();
                Ok(Operator::Changed)
            }
            _ => Err(self.fail(factory::bad_operator)),
        }
    }

    fn advance_if_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current().is_keyword(keyword) {
            self.tokens.advance();
            true
        } else {
            false
        }
    }

    // === OPERANDS ===

    fn operand(&mut self) -> SyntaxResult<Operand> {
        let token = self.current();
        match token.kind {
            TokenKind::Keyword(keyword) if keyword.is_empty_marker() => {
                self.tokens.advance();
                Ok(Operand::empty())
            }
            TokenKind::LParen => self.nested(|grammar| grammar.list()),
            TokenKind::Str(_) | TokenKind::Number => {
                if self.tokens.peek_ahead(1).kind == TokenKind::LParen {
                    return self.function();
                }
                let token = self.tokens.advance();
                value_of(&token).map(Operand::Single)
            }
            _ => Err(self.fail(factory::bad_operand)),
        }
    }

    fn list(&mut self) -> SyntaxResult<Operand> {
        self.tokens.advance();
        if self.tokens.check(&TokenKind::RParen) {
            return Err(self.fail(factory::bad_operand));
        }

        let mut items = vec![self.operand()?];
        loop {
            if self.tokens.advance_if(&TokenKind::Comma) {
                items.push(self.operand()?);
            } else if self.tokens.advance_if(&TokenKind::RParen) {
                return Ok(Operand::Multi(items));
            } else {
                return Err(self.fail(|token| factory::expected_text(token, ")")));
            }
        }
    }

    /// `name(arg, ...)`; the cursor is on the name and `(` follows it
    fn function(&mut self) -> SyntaxResult<Operand> {
        let name = self.tokens.advance();
        if name.text.trim().is_empty() {
            return Err(factory::empty_function_name(name.line(), name.column()));
        }
        self.tokens.advance();

        let mut args = Vec::new();
        if self.tokens.advance_if(&TokenKind::RParen) {
            return Ok(Operand::function(name.text, args));
        }
        if self.tokens.is_at_end() {
            return Err(self.fail(|token| factory::expected_text(token, ")")));
        }

        args.push(self.argument()?);
        loop {
            if self.tokens.advance_if(&TokenKind::RParen) {
                return Ok(Operand::function(name.text, args));
            }
            if self.tokens.advance_if(&TokenKind::Comma) {
                if self.tokens.check(&TokenKind::RParen) {
                    return Err(self.fail(factory::empty_function_argument));
                }
                args.push(self.argument()?);
            } else if self.tokens.is_at_end() {
                return Err(self.fail(|token| factory::expected_text(token, ")")));
            } else {
                return Err(self.fail(|token| factory::expected_text2(token, ")", ",")));
            }
        }
    }

    fn argument(&mut self) -> SyntaxResult<String> {
        if self.current().is_word() {
            Ok(self.tokens.advance().text)
        } else {
            Err(self.fail(factory::bad_function_argument))
        }
    }

    // === ORDER BY ===

    fn order_by(&mut self) -> SyntaxResult<Vec<SearchSort>> {
        self.tokens.advance();
        self.expect_keyword(Keyword::By, "by")?;

        let mut sorts = vec![self.sort()?];
        loop {
            if self.tokens.is_at_end() {
                return Ok(sorts);
            }
            if self.tokens.advance_if(&TokenKind::Comma) {
                sorts.push(self.sort()?);
                continue;
            }
            let has_direction = sorts.last().map(|sort| sort.direction.is_some()).unwrap_or(false);
            return Err(if !has_direction && self.current().is_word() {
                self.fail(factory::bad_sort_order)
            } else {
                self.fail(|token| factory::expected_text(token, ","))
            });
        }
    }

    fn sort(&mut self) -> SyntaxResult<SearchSort> {
        let field = self.field()?;
        let direction = match self.current().keyword() {
            Some(Keyword::Asc) => Some(SortDirection::Asc),
            Some(Keyword::Desc) => Some(SortDirection::Desc),
            _ => None,
        };
        if direction.is_some() {
            self.tokens.advance();
        }
        Ok(SearchSort::new(field, direction))
    }
}

/// Literal value of a word token; numbers must fit in an `i64`
fn value_of(token: &Token) -> SyntaxResult<Value> {
    match token.kind {
        TokenKind::Number => token
            .text
            .parse::<i64>()
            .map(Value::NumberLiteral)
            .map_err(|_| factory::illegal_number(&token.text, token.line(), token.column())),
        _ => Ok(Value::StringLiteral(token.text.clone())),
    }
}
