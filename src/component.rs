use crate::{
	binding,
	cache::{self, Cached},
	diff::{self, Outcome},
	dom::Dom,
	events,
	temp_map::TempIndexMap,
	template::{self, Template},
	Attribute, Attributes, Definition, Listeners, Options, Result, Value,
};
use tracing::{instrument, trace, trace_span};

/// Where a component is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Constructed,
	/// Rendered once, through the cache path.
	FirstRendered,
	/// Rendered again at least once, through the update path.
	Rendered,
}

/// A mounted component instance.
///
/// It owns its [`Dom`] and with it the mount point, which exists for as long as the component does.
/// Attribute and listener configuration is copied from the [`Definition`] at construction,
/// so instances of the same definition don't share state.
pub struct Component<D: Dom> {
	pub(crate) name: String,
	pub(crate) attributes: Attributes<D>,
	pub(crate) listeners: Listeners<D>,
	pub(crate) template: Template<D>,
	pub(crate) options: Options,
	pub(crate) dom: D,
	pub(crate) cached: Option<Cached>,
	pub(crate) lookup: TempIndexMap<D::Node>,
	pub(crate) renders: usize,
	pub(crate) outcome: Option<Outcome>,
}

impl<D: Dom> Component<D> {
	/// Creates the instance, installs one native listener per configured event and renders for the first time.
	///
	/// # Errors
	///
	/// Iff a listener can't be installed or the first render fails.
	#[instrument(skip(definition, dom))]
	pub fn new(name: &str, definition: &Definition<D>, dom: D) -> Result<Self> {
		let mut this = Self {
			name: name.to_owned(),
			attributes: definition.attributes().clone(),
			listeners: definition.listeners().clone(),
			template: definition.template().clone(),
			options: *definition.options(),
			dom,
			cached: None,
			lookup: TempIndexMap::new(),
			renders: 0,
			outcome: None,
		};
		events::install(&mut this)?;
		this.render()?;
		Ok(this)
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Reads an attribute. Computed attributes are evaluated with `self`. Unknown keys read as [`Value::Null`].
	#[must_use]
	pub fn get(&self, key: &str) -> Value {
		match self.attributes.slot(key) {
			None => Value::Null,
			Some(Attribute::Value(value)) => value.clone(),
			Some(Attribute::Computed(compute)) => compute(self),
		}
	}

	#[must_use]
	pub fn has(&self, key: &str) -> bool {
		self.attributes.contains(key)
	}

	/// Overwrites an attribute slot, defining it if necessary. A stored computation is replaced, never called.
	///
	/// Unless the new attribute is [computed](`Attribute::Computed`), this renders the component once.
	///
	/// # Errors
	///
	/// Iff the triggered render fails. The attribute is written either way.
	pub fn set(&mut self, key: &str, attribute: impl Into<Attribute<D>>) -> Result<()> {
		let attribute = attribute.into();
		let computed = attribute.is_computed();
		self.attributes.insert(key, attribute);
		if computed {
			trace!("Stored computed attribute {:?} without rendering.", key);
			Ok(())
		} else {
			self.render()
		}
	}

	/// Shorthand for [`set`](`Component::set`)ting an [`Attribute::computed`].
	///
	/// # Errors
	///
	/// Never, since storing a computation doesn't render.
	pub fn set_computed(&mut self, key: &str, compute: impl 'static + Fn(&Self) -> Value) -> Result<()> {
		self.set(key, Attribute::computed(compute))
	}

	#[must_use]
	pub fn attributes(&self) -> &Attributes<D> {
		&self.attributes
	}

	#[must_use]
	pub fn template(&self) -> &Template<D> {
		&self.template
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.options
	}

	#[must_use]
	pub fn dom(&self) -> &D {
		&self.dom
	}

	/// Direct access to the document, for example to simulate user input.
	/// Changes made here are not tracked and may be overwritten by the next render.
	pub fn dom_mut(&mut self) -> &mut D {
		&mut self.dom
	}

	/// The mount point.
	#[must_use]
	pub fn root(&self) -> D::Node {
		self.dom.root()
	}

	/// The number of render passes so far.
	#[must_use]
	pub fn renders(&self) -> usize {
		self.renders
	}

	/// What the most recent update pass changed. [`None`] until the second render.
	#[must_use]
	pub fn last_outcome(&self) -> Option<Outcome> {
		self.outcome
	}

	#[must_use]
	pub fn phase(&self) -> Phase {
		match (&self.cached, self.renders) {
			(None, _) => Phase::Constructed,
			(Some(_), 1) => Phase::FirstRendered,
			(Some(_), _) => Phase::Rendered,
		}
	}

	/// Renders the template and brings the mount point in line with it:
	/// The first time through the [cache](`cache::cache`) path, later through the [update](`diff::update`) path.
	/// Value bindings and conditions are applied afterwards.
	///
	/// # Errors
	///
	/// Iff a DOM operation fails or a `:if` expression is malformed.
	pub fn render(&mut self) -> Result<()> {
		let span = trace_span!("Rendering", component = %self.name, pass = self.renders);
		let _enter = span.enter();

		let markup = template::render_markup(self);
		self.renders += 1;
		let root = self.dom.root();

		match self.cached.take() {
			None => {
				self.dom.set_inner_html(&root, &markup)?;
				self.cached = Some(cache::cache(&mut self.dom, &root, &self.options)?);
			}
			Some(mut cached) => {
				let fragment = self.dom.parse_detached(&markup);
				let result = fragment.and_then(|fragment| {
					let result = diff::update(&mut self.dom, &fragment, &mut cached, &mut self.lookup, &self.options);
					self.dom.discard(&fragment);
					result
				});
				self.cached = Some(cached);
				self.outcome = Some(result?);
			}
		}

		binding::apply(self)
	}
}
