//! Parser for the textual condition form.
//!
//! # Grammar
//!
//! ```text
//! expr    := or
//! or      := and (("OR" | "||") and)*
//! and     := unary (("AND" | "&&") unary)*
//! unary   := ("NOT" | "!") unary | "(" expr ")" | "true" | "false" | compare
//! compare := "@" ident ( ("==" | "!=") literal
//!                      | "is" ("true" | "false")
//!                      | "in" "[" (literal ("," literal)*)? "]" )?
//! literal := string | number | "true" | "false"
//! ```
//!
//! Keywords are case-insensitive. A bare `@ident` means `@ident is true`;
//! `true` and `false` are the empty AND and the empty OR.

use super::Condition;
use crate::catalog::Value;
use crate::reference::{is_identifier_char, is_identifier_start};

/// Deepest `NOT`/parenthesis nesting the parser accepts.
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    EqEq,
    NotEq,
    Bang,
    AndAnd,
    OrOr,
    Ref(String),
    Str(String),
    Num(f64),
    Word(String),
}

impl Token {
    fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Bang => "'!'".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Ref(id) => format!("'@{}'", id),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Num(n) => format!("number {}", n),
            Token::Word(w) => format!("'{}'", w),
        }
    }
}

impl Condition {
    /// Parse the textual condition form.
    ///
    /// Never fails: a parse error yields [`Condition::Malformed`] carrying the
    /// error and the original text.
    pub fn parse(text: &str) -> Condition {
        match parse_expression(text) {
            Ok(condition) => condition,
            Err(reason) => Condition::malformed(reason, serde_json::Value::from(text)),
        }
    }
}

fn parse_expression(text: &str) -> Result<Condition, String> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err("empty condition".to_string());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let condition = parser.parse_or()?;

    if let Some((position, token)) = parser.tokens.get(parser.pos) {
        return Err(format!(
            "unexpected {} at position {}",
            token.describe(),
            position
        ));
    }

    Ok(condition)
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '=' => match chars.next() {
                Some((_, '=')) => Token::EqEq,
                _ => return Err(format!("expected '==' at position {}", pos)),
            },
            '!' => {
                if let Some((_, '=')) = chars.peek() {
                    chars.next();
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            '&' => match chars.next() {
                Some((_, '&')) => Token::AndAnd,
                _ => return Err(format!("expected '&&' at position {}", pos)),
            },
            '|' => match chars.next() {
                Some((_, '|')) => Token::OrOr,
                _ => return Err(format!("expected '||' at position {}", pos)),
            },
            '@' => {
                let mut name = String::new();
                match chars.peek() {
                    Some((_, c)) if is_identifier_start(*c) => {}
                    _ => {
                        return Err(format!(
                            "expected parameter name after '@' at position {}",
                            pos
                        ));
                    }
                }
                while let Some((_, c)) = chars.peek() {
                    if !is_identifier_char(*c) {
                        break;
                    }
                    name.push(*c);
                    chars.next();
                }
                Token::Ref(name)
            }
            '"' | '\'' => {
                let quote = ch;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, c)) => value.push(c),
                            None => return Err(format!("unterminated string at position {}", pos)),
                        },
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => value.push(c),
                        None => return Err(format!("unterminated string at position {}", pos)),
                    }
                }
                Token::Str(value)
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut literal = String::from(c);
                while let Some((_, next)) = chars.peek() {
                    if !(next.is_ascii_digit() || matches!(next, '.' | 'e' | 'E' | '+' | '-')) {
                        break;
                    }
                    literal.push(*next);
                    chars.next();
                }
                match literal.parse::<f64>() {
                    Ok(n) if n.is_finite() => Token::Num(n),
                    _ => return Err(format!("invalid number '{}' at position {}", literal, pos)),
                }
            }
            c if is_identifier_start(c) => {
                let mut word = String::from(c);
                while let Some((_, next)) = chars.peek() {
                    if !is_identifier_char(*next) {
                        break;
                    }
                    word.push(*next);
                    chars.next();
                }
                Token::Word(word)
            }
            other => {
                return Err(format!(
                    "unexpected character '{}' at position {}",
                    other, pos
                ));
            }
        };
        tokens.push((pos, token));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, expected: &str) -> String {
        match self.tokens.get(self.pos) {
            Some((position, token)) => format!(
                "expected {}, found {} at position {}",
                expected,
                token.describe(),
                position
            ),
            None => format!("expected {}, reached end of condition", expected),
        }
    }

    fn parse_or(&mut self) -> Result<Condition, String> {
        let mut children = vec![self.parse_and()?];
        while matches!(self.peek(), Some(t) if *t == Token::OrOr || t.is_word("or")) {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(collapse(children, Condition::or))
    }

    fn parse_and(&mut self) -> Result<Condition, String> {
        let mut children = vec![self.parse_unary()?];
        while matches!(self.peek(), Some(t) if *t == Token::AndAnd || t.is_word("and")) {
            self.advance();
            children.push(self.parse_unary()?);
        }
        Ok(collapse(children, Condition::and))
    }

    fn parse_unary(&mut self) -> Result<Condition, String> {
        if self.depth >= MAX_NESTING {
            return Err(format!(
                "condition nested too deeply (more than {} levels)",
                MAX_NESTING
            ));
        }
        self.depth += 1;
        let result = self.parse_prefixed();
        self.depth -= 1;
        result
    }

    fn parse_prefixed(&mut self) -> Result<Condition, String> {
        match self.peek() {
            Some(t) if *t == Token::Bang || t.is_word("not") => {
                self.advance();
                Ok(Condition::not(self.parse_unary()?))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_or()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.error_here("')'"));
                }
                self.advance();
                Ok(inner)
            }
            Some(t) if t.is_word("true") => {
                self.advance();
                Ok(Condition::and(Vec::new()))
            }
            Some(t) if t.is_word("false") => {
                self.advance();
                Ok(Condition::or(Vec::new()))
            }
            Some(Token::Ref(_)) => {
                let Some(Token::Ref(id)) = self.advance() else {
                    return Err(self.error_here("a parameter reference"));
                };
                self.parse_comparison(id)
            }
            _ => Err(self.error_here("a condition")),
        }
    }

    fn parse_comparison(&mut self, parameter_id: String) -> Result<Condition, String> {
        match self.peek() {
            Some(Token::EqEq) => {
                self.advance();
                Ok(Condition::equals(parameter_id, self.parse_literal()?))
            }
            Some(Token::NotEq) => {
                self.advance();
                Ok(Condition::not_equals(parameter_id, self.parse_literal()?))
            }
            Some(t) if t.is_word("is") => {
                self.advance();
                match self.peek() {
                    Some(t) if t.is_word("true") => {
                        self.advance();
                        Ok(Condition::is_true(parameter_id))
                    }
                    Some(t) if t.is_word("false") => {
                        self.advance();
                        Ok(Condition::is_false(parameter_id))
                    }
                    _ => Err(self.error_here("'true' or 'false' after 'is'")),
                }
            }
            Some(t) if t.is_word("in") => {
                self.advance();
                if self.peek() != Some(&Token::LBracket) {
                    return Err(self.error_here("'['"));
                }
                self.advance();
                let mut candidates = Vec::new();
                if self.peek() == Some(&Token::RBracket) {
                    self.advance();
                    return Ok(Condition::one_of(parameter_id, candidates));
                }
                loop {
                    candidates.push(self.parse_literal()?);
                    match self.peek() {
                        Some(Token::Comma) => {
                            self.advance();
                        }
                        Some(Token::RBracket) => {
                            self.advance();
                            break;
                        }
                        _ => return Err(self.error_here("',' or ']'")),
                    }
                }
                Ok(Condition::one_of(parameter_id, candidates))
            }
            _ => Ok(Condition::is_true(parameter_id)),
        }
    }

    fn parse_literal(&mut self) -> Result<Value, String> {
        let value = match self.peek() {
            Some(Token::Str(s)) => Value::Text(s.clone()),
            Some(Token::Num(n)) => Value::Number(*n),
            Some(t) if t.is_word("true") => Value::Bool(true),
            Some(t) if t.is_word("false") => Value::Bool(false),
            _ => return Err(self.error_here("a literal value")),
        };
        self.advance();
        Ok(value)
    }
}

fn collapse(mut children: Vec<Condition>, build: fn(Vec<Condition>) -> Condition) -> Condition {
    if children.len() == 1 {
        children.remove(0)
    } else {
        build(children)
    }
}
