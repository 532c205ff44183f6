use crate::{dom::Dom, Component, Definition, Error, Result};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, warn};

/// Component name → [`Definition`], passed to whatever bootstraps the application.
pub struct Registry<D: Dom> {
	definitions: HashMap<String, Definition<D>>,
	order: Vec<String>,
}

impl<D: Dom> Default for Registry<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Dom> core::fmt::Debug for Registry<D> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_list().entries(&self.order).finish()
	}
}

/// Custom element names start with a lower-case ASCII letter and contain a hyphen.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
	name.starts_with(|c: char| c.is_ascii_lowercase())
		&& name.contains('-')
		&& !name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='))
}

impl<D: Dom> Registry<D> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			definitions: HashMap::new(),
			order: Vec::new(),
		}
	}

	/// Registers `definition` under `name`.
	///
	/// Names that are taken already or aren't valid custom element names are logged and ignored.
	#[instrument(skip(self, definition))]
	pub fn register(&mut self, name: &str, definition: Definition<D>) -> &mut Self {
		if self.definitions.contains_key(name) {
			warn!("Component {:?} has already been registered.", name);
		} else if !is_valid_name(name) {
			error!("{:?} is not a valid custom element name.", name);
		} else {
			self.definitions.insert(name.to_owned(), definition);
			self.order.push(name.to_owned());
		}
		self
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.definitions.contains_key(name)
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Definition<D>> {
		self.definitions.get(name)
	}

	/// Registered names, in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.order.iter().map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.order.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Constructs one instance of the component `name` into `dom`.
	///
	/// # Errors
	///
	/// Iff `name` is not registered or construction fails.
	pub fn create(&self, name: &str, dom: D) -> Result<Component<D>> {
		let definition = self.get(name).ok_or_else(|| Error::UnknownComponent(name.to_owned()))?;
		Component::new(name, definition, dom)
	}

	/// Constructs one instance of each registered component, in registration order, each into a fresh document from `factory`.
	///
	/// # Errors
	///
	/// Iff `factory` or a construction fails. Components constructed before that are dropped.
	#[instrument(skip(self, factory))]
	pub fn mount_all(&self, mut factory: impl FnMut(&str) -> Result<D>) -> Result<Vec<Component<D>>> {
		let mut mounted = Vec::with_capacity(self.order.len());
		for name in &self.order {
			trace!("Mounting {:?}.", name);
			mounted.push(self.create(name, factory(name)?)?);
		}
		Ok(mounted)
	}
}
