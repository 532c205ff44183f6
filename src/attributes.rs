use crate::{dom::Dom, Component, Value};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;

/// The stored form of a reactive attribute.
pub enum Attribute<D: Dom> {
	Value(Value),
	/// Evaluated with the component on every read.
	Computed(Rc<dyn Fn(&Component<D>) -> Value>),
}

impl<D: Dom> Attribute<D> {
	pub fn computed(compute: impl 'static + Fn(&Component<D>) -> Value) -> Self {
		Self::Computed(Rc::new(compute))
	}

	#[must_use]
	pub fn is_computed(&self) -> bool {
		matches!(self, Self::Computed(_))
	}
}

impl<D: Dom> Clone for Attribute<D> {
	fn clone(&self) -> Self {
		match self {
			Self::Value(value) => Self::Value(value.clone()),
			Self::Computed(compute) => Self::Computed(Rc::clone(compute)),
		}
	}
}

impl<D: Dom> Debug for Attribute<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Computed(compute) => f.debug_tuple("Computed").field(&Rc::as_ptr(compute)).finish(),
		}
	}
}

impl<D: Dom> From<Value> for Attribute<D> {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

macro_rules! attribute_from {
	($($t:ty),*$(,)?) => {$(
		impl<D: Dom> From<$t> for Attribute<D> {
			fn from(value: $t) -> Self {
				Self::Value(value.into())
			}
		}
	)*};
}
attribute_from!(bool, String, &str, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Named attribute slots of one component instance.
pub struct Attributes<D: Dom>(HashMap<String, Attribute<D>>);

impl<D: Dom> Default for Attributes<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Dom> Clone for Attributes<D> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<D: Dom> Debug for Attributes<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter()).finish()
	}
}

impl<D: Dom> Attributes<D> {
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// Builder-style [`Attributes::insert`].
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, attribute: impl Into<Attribute<D>>) -> Self {
		self.insert(key, attribute);
		self
	}

	#[must_use]
	pub fn with_computed(self, key: impl Into<String>, compute: impl 'static + Fn(&Component<D>) -> Value) -> Self {
		self.with(key, Attribute::computed(compute))
	}

	/// Overwrites the slot, returning the previous one.
	pub fn insert(&mut self, key: impl Into<String>, attribute: impl Into<Attribute<D>>) -> Option<Attribute<D>> {
		self.0.insert(key.into(), attribute.into())
	}

	#[must_use]
	pub fn slot(&self, key: &str) -> Option<&Attribute<D>> {
		self.0.get(key)
	}

	#[must_use]
	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<D: Dom, K: Into<String>, A: Into<Attribute<D>>> core::iter::FromIterator<(K, A)> for Attributes<D> {
	fn from_iter<I: IntoIterator<Item = (K, A)>>(iter: I) -> Self {
		let mut attributes = Self::new();
		for (key, attribute) in iter {
			attributes.insert(key, attribute);
		}
		attributes
	}
}
