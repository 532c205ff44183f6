use crate::{dom::Dom, Attributes, Component, Options, Result, Template};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;

/// An event handler. It runs after any `:bind` update the same event caused.
pub type Listener<D> = Rc<dyn Fn(&mut Component<D>) -> Result<()>>;

/// Event name → [`Listener`].
pub struct Listeners<D: Dom>(HashMap<String, Listener<D>>);

impl<D: Dom> Default for Listeners<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Dom> Clone for Listeners<D> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<D: Dom> Debug for Listeners<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.0.keys()).finish()
	}
}

impl<D: Dom> Listeners<D> {
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// Builder-style [`Listeners::insert`].
	#[must_use]
	pub fn on(mut self, event: impl Into<String>, listener: impl 'static + Fn(&mut Component<D>) -> Result<()>) -> Self {
		self.insert(event, listener);
		self
	}

	pub fn insert(&mut self, event: impl Into<String>, listener: impl 'static + Fn(&mut Component<D>) -> Result<()>) {
		self.0.insert(event.into(), Rc::new(listener));
	}

	#[must_use]
	pub fn get(&self, event: &str) -> Option<&Listener<D>> {
		self.0.get(event)
	}

	pub fn events(&self) -> impl Iterator<Item = &str> {
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

/// Everything needed to construct [`Component`]s of one kind.
///
/// Each setter replaces the previous configuration wholesale.
pub struct Definition<D: Dom> {
	template: Template<D>,
	attributes: Attributes<D>,
	listeners: Listeners<D>,
	options: Options,
}

impl<D: Dom> Default for Definition<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Dom> Clone for Definition<D> {
	fn clone(&self) -> Self {
		Self {
			template: self.template.clone(),
			attributes: self.attributes.clone(),
			listeners: self.listeners.clone(),
			options: self.options,
		}
	}
}

impl<D: Dom> Debug for Definition<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Definition")
			.field("template", &self.template)
			.field("attributes", &self.attributes)
			.field("listeners", &self.listeners)
			.field("options", &self.options)
			.finish()
	}
}

impl<D: Dom> Definition<D> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			template: Template::default(),
			attributes: Attributes::new(),
			listeners: Listeners::new(),
			options: Options::default(),
		}
	}

	#[must_use]
	pub fn set_template(self, template: impl Into<Template<D>>) -> Self {
		Self {
			template: template.into(),
			..self
		}
	}

	#[must_use]
	pub fn set_attributes(self, attributes: Attributes<D>) -> Self {
		Self { attributes, ..self }
	}

	#[must_use]
	pub fn set_listeners(self, listeners: Listeners<D>) -> Self {
		Self { listeners, ..self }
	}

	#[must_use]
	pub fn set_options(self, options: Options) -> Self {
		Self { options, ..self }
	}

	#[must_use]
	pub fn template(&self) -> &Template<D> {
		&self.template
	}

	#[must_use]
	pub fn attributes(&self) -> &Attributes<D> {
		&self.attributes
	}

	#[must_use]
	pub fn listeners(&self) -> &Listeners<D> {
		&self.listeners
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.options
	}
}
