use crate::{dom::Dom, Component};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::{level_filters::STATIC_MAX_LEVEL, trace, Level};

pub const DEFAULT_TEMPLATE: &str = "<div><slot></slot></div>";

/// Markup source of a component.
pub enum Template<D: Dom> {
	Static(String),
	/// Called with the component on every render.
	///
	/// The component is only borrowed shared, so a template can read attributes but never write them.
	Dynamic(Rc<dyn Fn(&Component<D>) -> String>),
}

impl<D: Dom> Template<D> {
	pub fn dynamic(render: impl 'static + Fn(&Component<D>) -> String) -> Self {
		Self::Dynamic(Rc::new(render))
	}
}

impl<D: Dom> Default for Template<D> {
	fn default() -> Self {
		Self::Static(DEFAULT_TEMPLATE.to_owned())
	}
}

impl<D: Dom> Clone for Template<D> {
	fn clone(&self) -> Self {
		match self {
			Self::Static(markup) => Self::Static(markup.clone()),
			Self::Dynamic(render) => Self::Dynamic(Rc::clone(render)),
		}
	}
}

impl<D: Dom> Debug for Template<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(markup) => f.debug_tuple("Static").field(&markup.len()).finish(),
			Self::Dynamic(render) => f.debug_tuple("Dynamic").field(&Rc::as_ptr(render)).finish(),
		}
	}
}

impl<D: Dom> From<&str> for Template<D> {
	fn from(markup: &str) -> Self {
		Self::Static(markup.to_owned())
	}
}

impl<D: Dom> From<String> for Template<D> {
	fn from(markup: String) -> Self {
		Self::Static(markup)
	}
}

/// Produces the component's current markup.
pub fn render_markup<D: Dom>(component: &Component<D>) -> String {
	let markup = match component.template() {
		Template::Static(markup) => markup.clone(),
		Template::Dynamic(render) => render(component),
	};
	if STATIC_MAX_LEVEL >= Level::TRACE {
		if cfg!(feature = "dangerous-logging") {
			trace!(%markup, "Rendered template.");
		} else {
			trace!(markup.len = markup.len(), "Rendered template.");
		}
	}
	markup
}
