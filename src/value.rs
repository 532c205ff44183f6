use core::fmt::{self, Display, Formatter};
use num_traits::ToPrimitive;

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Number(f64),
	Text(String),
}

impl Default for Value {
	fn default() -> Self {
		Self::Null
	}
}

impl Value {
	/// Converts any primitive number. Values that don't fit into an [`f64`] become `NaN`.
	pub fn number(n: impl ToPrimitive) -> Self {
		Self::Number(n.to_f64().unwrap_or(f64::NAN))
	}

	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// `null`, `false`, `0`, `NaN` and the empty string are falsy.
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Null => false,
			Self::Bool(b) => *b,
			Self::Number(n) => *n != 0.0 && !n.is_nan(),
			Self::Text(text) => !text.is_empty(),
		}
	}

	/// Integer prefix of the value, with `parseInt` rules for text:
	/// Leading whitespace is skipped, then an optional sign and at least one decimal digit are read.
	///
	/// The result is a float, so digit runs beyond the `i64` range lose precision instead of failing.
	#[must_use]
	pub fn to_int(&self) -> Option<f64> {
		match self {
			Self::Null | Self::Bool(_) => None,
			Self::Number(n) if n.is_finite() => Some(n.trunc()),
			Self::Number(_) => None,
			Self::Text(text) => parse_int_prefix(text),
		}
	}

	/// Numeric reading of the value. Text must be a complete number after trimming.
	#[must_use]
	pub fn to_number(&self) -> Option<f64> {
		match self {
			Self::Null => None,
			Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
			Self::Number(n) => Some(*n),
			Self::Text(text) => {
				let text = text.trim();
				if text.is_empty() {
					None
				} else {
					text.parse().ok()
				}
			}
		}
	}
}

fn parse_int_prefix(text: &str) -> Option<f64> {
	let text = text.trim_start();
	let (negative, digits) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};
	let end = digits.bytes().take_while(u8::is_ascii_digit).count();
	if end == 0 {
		return None;
	}
	let magnitude: f64 = digits[..end].parse().ok()?;
	Some(if negative { -magnitude } else { magnitude })
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(b) => Display::fmt(b, f),
			Self::Number(n) if n.is_nan() => f.write_str("NaN"),
			Self::Number(n) if n.is_infinite() => f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" }),
			Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e16 => write!(f, "{}", *n as i64),
			Self::Number(n) => Display::fmt(n, f),
			Self::Text(text) => f.write_str(text),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

macro_rules! number_from {
	($($t:ty),*$(,)?) => {$(
		impl From<$t> for Value {
			fn from(n: $t) -> Self {
				Self::number(n)
			}
		}
	)*};
}
number_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(option: Option<T>) -> Self {
		option.map_or(Self::Null, Into::into)
	}
}
