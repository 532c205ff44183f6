use hashbrown::HashMap;
use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast};

/// Keeps the native event listeners of one mount point alive, one per event name.
#[derive(Debug, Default)]
pub(crate) struct ClosureMap(HashMap<String, Closure<dyn Fn(web_sys::Event)>>);

impl ClosureMap {
	pub(crate) fn new() -> Self {
		Self(HashMap::new())
	}

	pub(crate) fn contains(&self, event: &str) -> bool {
		self.0.contains_key(event)
	}

	/// Adds `closure` as listener for `event` on `target` and keeps it until [`ClosureMap::unpublish_all`].
	pub(crate) fn publish(&mut self, target: &web_sys::EventTarget, event: &str, closure: Closure<dyn Fn(web_sys::Event)>) -> Result<(), wasm_bindgen::JsValue> {
		target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
		trace!("Created Closure for {:?}.", event);
		self.0.insert(event.to_owned(), closure);
		Ok(())
	}

	/// Detaches and drops every listener.
	pub(crate) fn unpublish_all(&mut self, target: &web_sys::EventTarget) {
		for (event, closure) in self.0.drain() {
			if let Err(error) = target.remove_event_listener_with_callback(&event, closure.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", event, error);
			}
			trace!("Destroyed Closure for {:?}.", event);
		}
	}
}
