//! Routing of native events to `:bind` updates and listeners.

use crate::{binding::BIND, dom::Dom, Component, Result, Value};
use std::rc::Rc;
use tracing::{instrument, trace};

/// Installs one native listener on the mount point per configured event name.
pub(crate) fn install<D: Dom>(component: &mut Component<D>) -> Result<()> {
	let events: Vec<String> = component.listeners.events().map(str::to_owned).collect();
	for event in events {
		component.dom.listen(&event)?;
	}
	Ok(())
}

impl<D: Dom> Component<D> {
	/// Handles an event that reached the mount point, originating at `target`.
	///
	/// If `target` is bound to a known attribute via `:bind`, that attribute is [`set`](`Component::set`) to the target's
	/// current value as text first, which renders. The listener configured for `event`, if any, runs afterwards.
	///
	/// # Errors
	///
	/// Iff the render or the listener fails.
	#[instrument(skip(self, target), fields(component = %self.name))]
	pub fn handle_event(&mut self, event: &str, target: Option<&D::Node>) -> Result<()> {
		if let Some(target) = target {
			match self.dom.attribute(target, BIND) {
				Some(key) if !key.is_empty() && self.has(&key) => {
					let value = self.dom.value(target).unwrap_or_default();
					trace!("Updating bound attribute {:?}.", key);
					self.set(&key, Value::Text(value))?;
				}
				Some(key) => trace!("Ignoring binding to unknown attribute {:?}.", key),
				None => (),
			}
		}

		let listener = match self.listeners.get(event) {
			Some(listener) => Rc::clone(listener),
			None => return Ok(()),
		};
		listener(self)
	}

	/// Delivers an event the way a native listener on the mount point would:
	/// Events nothing listens for are not observed at all.
	///
	/// # Errors
	///
	/// See [`Component::handle_event`].
	pub fn dispatch(&mut self, event: &str, target: Option<&D::Node>) -> Result<()> {
		if !self.dom.is_listening(event) {
			trace!("No native listener for {:?}.", event);
			return Ok(());
		}
		self.handle_event(event, target)
	}
}
