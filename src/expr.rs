//! The expression language of `:if` directives.
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | compare
//! compare := primary ( ( "==" | "===" | "!=" | "!==" | "<" | "<=" | ">" | ">=" ) primary )?
//! primary := number | string | "true" | "false" | "null" | path | "(" expr ")"
//! path    := ident ( "." ident )?
//! ```
//!
//! Paths name component attributes. `self.x` and `x` are the same lookup.
//! Nothing else is reachable from an expression, so markup can't run arbitrary code.

use crate::Value;
use core::cmp::Ordering;
use thiserror::Error;

/// Parentheses and `!` may nest this deep.
const NESTING_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
	#[error("unexpected character {found:?} at byte {offset}")]
	UnexpectedCharacter { offset: usize, found: char },
	#[error("unterminated string starting at byte {offset}")]
	UnterminatedString { offset: usize },
	#[error("expected {expected} at byte {offset}")]
	Expected { offset: usize, expected: &'static str },
	#[error("unexpected input after the expression at byte {offset}")]
	TrailingInput { offset: usize },
	#[error("expression nests too deeply")]
	TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Literal(Value),
	Attribute(String),
	Not(Box<Expr>),
	And(Box<Expr>, Box<Expr>),
	Or(Box<Expr>, Box<Expr>),
	Compare(CompareOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
	Number(f64),
	Str(String),
	Ident(String),
	Dot,
	Not,
	And,
	Or,
	Compare(CompareOp),
	Open,
	Close,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, ExprError> {
	let mut tokens = Vec::new();
	let mut chars = source.char_indices().peekable();

	while let Some(&(offset, c)) = chars.peek() {
		let token = match c {
			c if c.is_whitespace() => {
				chars.next();
				continue;
			}
			'(' => {
				chars.next();
				Token::Open
			}
			')' => {
				chars.next();
				Token::Close
			}
			'.' => {
				chars.next();
				Token::Dot
			}
			'!' | '=' | '<' | '>' => {
				chars.next();
				let equals = chars.next_if(|&(_, c)| c == '=').is_some();
				match (c, equals) {
					('!', false) => Token::Not,
					('!', true) => {
						chars.next_if(|&(_, c)| c == '=');
						Token::Compare(CompareOp::Ne)
					}
					('=', true) => {
						chars.next_if(|&(_, c)| c == '=');
						Token::Compare(CompareOp::Eq)
					}
					('=', false) => return Err(ExprError::UnexpectedCharacter { offset, found: '=' }),
					('<', false) => Token::Compare(CompareOp::Lt),
					('<', true) => Token::Compare(CompareOp::Le),
					('>', false) => Token::Compare(CompareOp::Gt),
					(_, _) => Token::Compare(CompareOp::Ge),
				}
			}
			'&' | '|' => {
				chars.next();
				if chars.next_if(|&(_, next)| next == c).is_none() {
					return Err(ExprError::UnexpectedCharacter { offset, found: c });
				}
				if c == '&' {
					Token::And
				} else {
					Token::Or
				}
			}
			'"' | '\'' => {
				chars.next();
				let mut text = String::new();
				loop {
					match chars.next() {
						None => return Err(ExprError::UnterminatedString { offset }),
						Some((_, '\\')) => match chars.next() {
							Some((_, escaped)) => text.push(escaped),
							None => return Err(ExprError::UnterminatedString { offset }),
						},
						Some((_, quote)) if quote == c => break,
						Some((_, other)) => text.push(other),
					}
				}
				Token::Str(text)
			}
			c if c.is_ascii_digit() => {
				let mut end = offset;
				while let Some(&(i, c)) = chars.peek() {
					if c.is_ascii_digit() || c == '.' {
						end = i + c.len_utf8();
						chars.next();
					} else {
						break;
					}
				}
				let number = source[offset..end].parse().map_err(|_| ExprError::Expected { offset, expected: "a number" })?;
				Token::Number(number)
			}
			c if c.is_alphabetic() || c == '_' || c == '$' => {
				let mut end = offset;
				while let Some(&(i, c)) = chars.peek() {
					if c.is_alphanumeric() || c == '_' || c == '$' || c == '-' {
						end = i + c.len_utf8();
						chars.next();
					} else {
						break;
					}
				}
				Token::Ident(source[offset..end].to_owned())
			}
			found => return Err(ExprError::UnexpectedCharacter { offset, found }),
		};
		tokens.push((offset, token));
	}
	Ok(tokens)
}

struct Parser {
	tokens: Vec<(usize, Token)>,
	position: usize,
	end: usize,
	nesting: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.position).map(|(_, token)| token)
	}

	fn offset(&self) -> usize {
		self.tokens.get(self.position).map_or(self.end, |&(offset, _)| offset)
	}

	fn next(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.position).map(|(_, token)| token.clone());
		self.position += 1;
		token
	}

	fn or(&mut self) -> Result<Expr, ExprError> {
		let mut left = self.and()?;
		while self.peek() == Some(&Token::Or) {
			self.next();
			left = Expr::Or(Box::new(left), Box::new(self.and()?));
		}
		Ok(left)
	}

	fn and(&mut self) -> Result<Expr, ExprError> {
		let mut left = self.unary()?;
		while self.peek() == Some(&Token::And) {
			self.next();
			left = Expr::And(Box::new(left), Box::new(self.unary()?));
		}
		Ok(left)
	}

	fn unary(&mut self) -> Result<Expr, ExprError> {
		if self.peek() == Some(&Token::Not) {
			self.next();
			self.nest(|this| this.unary()).map(|operand| Expr::Not(Box::new(operand)))
		} else {
			self.compare()
		}
	}

	fn compare(&mut self) -> Result<Expr, ExprError> {
		let left = self.primary()?;
		if let Some(&Token::Compare(op)) = self.peek() {
			self.next();
			let right = self.primary()?;
			return Ok(Expr::Compare(op, Box::new(left), Box::new(right)));
		}
		Ok(left)
	}

	fn primary(&mut self) -> Result<Expr, ExprError> {
		let offset = self.offset();
		match self.next() {
			Some(Token::Number(n)) => Ok(Expr::Literal(Value::Number(n))),
			Some(Token::Str(text)) => Ok(Expr::Literal(Value::Text(text))),
			Some(Token::Ident(ident)) => {
				let literal = match ident.as_str() {
					"true" => Some(Value::Bool(true)),
					"false" => Some(Value::Bool(false)),
					"null" | "undefined" => Some(Value::Null),
					_ => None,
				};
				if let Some(literal) = literal {
					return Ok(Expr::Literal(literal));
				}
				if (ident == "self" || ident == "this") && self.peek() == Some(&Token::Dot) {
					self.next();
					let offset = self.offset();
					return match self.next() {
						Some(Token::Ident(name)) => Ok(Expr::Attribute(name)),
						_ => Err(ExprError::Expected { offset, expected: "an attribute name" }),
					};
				}
				Ok(Expr::Attribute(ident))
			}
			Some(Token::Open) => {
				let inner = self.nest(Self::or)?;
				let offset = self.offset();
				match self.next() {
					Some(Token::Close) => Ok(inner),
					_ => Err(ExprError::Expected { offset, expected: "`)`" }),
				}
			}
			_ => Err(ExprError::Expected { offset, expected: "a value" }),
		}
	}

	fn nest<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ExprError>) -> Result<T, ExprError> {
		self.nesting += 1;
		if self.nesting > NESTING_LIMIT {
			return Err(ExprError::TooDeep);
		}
		let result = parse(self);
		self.nesting -= 1;
		result
	}
}

/// # Errors
///
/// Iff `source` is not a well-formed expression.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
	let mut parser = Parser {
		tokens: tokenize(source)?,
		position: 0,
		end: source.len(),
		nesting: 0,
	};
	let expr = parser.or()?;
	if parser.position < parser.tokens.len() {
		return Err(ExprError::TrailingInput { offset: parser.offset() });
	}
	Ok(expr)
}

impl Expr {
	/// Evaluates to a value, looking attributes up through `lookup`. `&&` and `||` short-circuit and yield an operand.
	pub fn evaluate(&self, lookup: &dyn Fn(&str) -> Value) -> Value {
		match self {
			Self::Literal(value) => value.clone(),
			Self::Attribute(name) => lookup(name),
			Self::Not(operand) => Value::Bool(!operand.evaluate(lookup).is_truthy()),
			Self::And(left, right) => {
				let left = left.evaluate(lookup);
				if left.is_truthy() {
					right.evaluate(lookup)
				} else {
					left
				}
			}
			Self::Or(left, right) => {
				let left = left.evaluate(lookup);
				if left.is_truthy() {
					left
				} else {
					right.evaluate(lookup)
				}
			}
			Self::Compare(op, left, right) => Value::Bool(compare(*op, &left.evaluate(lookup), &right.evaluate(lookup))),
		}
	}
}

/// Numbers compare numerically, including text that reads as a number. Everything else compares as displayed.
/// `null` only equals `null` and is unordered.
fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
	let ordering = match (left, right) {
		(Value::Null, Value::Null) => Some(Ordering::Equal),
		(Value::Null, _) | (_, Value::Null) => None,
		_ => match (left.to_number(), right.to_number()) {
			(Some(l), Some(r)) => l.partial_cmp(&r),
			_ => Some(left.to_string().cmp(&right.to_string())),
		},
	};
	match op {
		CompareOp::Eq => ordering == Some(Ordering::Equal),
		CompareOp::Ne => ordering != Some(Ordering::Equal),
		CompareOp::Lt => ordering == Some(Ordering::Less),
		CompareOp::Le => matches!(ordering, Some(Ordering::Less) | Some(Ordering::Equal)),
		CompareOp::Gt => ordering == Some(Ordering::Greater),
		CompareOp::Ge => matches!(ordering, Some(Ordering::Greater) | Some(Ordering::Equal)),
	}
}

/// Parses and evaluates `source` in one go, returning the result's truthiness.
///
/// # Errors
///
/// Iff `source` is not a well-formed expression.
pub fn test(source: &str, lookup: &dyn Fn(&str) -> Value) -> Result<bool, ExprError> {
	Ok(parse(source)?.evaluate(lookup).is_truthy())
}
