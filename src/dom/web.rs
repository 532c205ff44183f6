//! The browser backend: components render into the open shadow root of a host element.

use super::Dom;
use crate::{closure_map::ClosureMap, Component, Error, Registry, Result};
use core::cell::RefCell;
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, DocumentFragment, Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, Node, NodeList, ShadowRoot, ShadowRootInit, ShadowRootMode};

type Sink = Rc<RefCell<Option<Box<dyn Fn(web_sys::Event)>>>>;

/// A [`Dom`] around the shadow root of a host element.
///
/// Native listeners forward into a sink that [`mount`] connects to the component once it exists.
pub struct WebDom {
	document: Document,
	root: ShadowRoot,
	sink: Sink,
	closures: ClosureMap,
}

impl core::fmt::Debug for WebDom {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("WebDom").field("root", &self.root).field("closures", &self.closures).finish()
	}
}

fn js_error(error: JsValue) -> Error {
	Error::Dom(match error.dyn_ref::<js_sys::Error>() {
		Some(error) => String::from(error.message()),
		None => format!("{:?}", error),
	})
}

fn not_an_element(node: &Node) -> Error {
	Error::Dom(format!("{:?} is not an element", node.node_name()))
}

fn attribute_selector(name: &str) -> String {
	format!("[{}]", name.replace(':', "\\:"))
}

fn collect_node_list(list: &NodeList) -> Vec<Node> {
	(0..list.length()).filter_map(|i| list.item(i)).collect()
}

impl WebDom {
	/// Attaches an open shadow root to `host`.
	///
	/// # Errors
	///
	/// Iff `host` can't have a shadow root, for example because it has one already.
	pub fn attach(host: &Element) -> Result<Self> {
		let root = host.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open)).map_err(js_error)?;
		let document = host.owner_document().ok_or_else(|| Error::Dom("The host element has no owner document.".to_owned()))?;
		Ok(Self {
			document,
			root,
			sink: Rc::default(),
			closures: ClosureMap::new(),
		})
	}

	#[must_use]
	pub fn shadow_root(&self) -> &ShadowRoot {
		&self.root
	}

	/// A detached `div` holding shallow clones of the children of `node`.
	fn shallow_copy(&self, node: &Node, elements_only: bool) -> Result<Element> {
		let container = self.document.create_element("div").map_err(js_error)?;
		for child in collect_node_list(&node.child_nodes()) {
			if elements_only && child.node_type() != Node::ELEMENT_NODE {
				continue;
			}
			container.append_child(&child.clone_node().map_err(js_error)?).map_err(js_error)?;
		}
		Ok(container)
	}
}

impl Drop for WebDom {
	fn drop(&mut self) {
		self.closures.unpublish_all(self.root.as_ref());
	}
}

impl Dom for WebDom {
	type Node = Node;

	fn root(&self) -> Node {
		self.root.clone().into()
	}

	fn parse_detached(&mut self, markup: &str) -> Result<Node> {
		let container = self.document.create_element("div").map_err(js_error)?;
		container.set_inner_html(markup);
		Ok(container.into())
	}

	fn discard(&mut self, node: &Node) {
		if let Some(element) = node.dyn_ref::<Element>() {
			element.remove();
		}
	}

	fn element_children(&self, node: &Node) -> Result<Vec<Node>> {
		let children = if let Some(element) = node.dyn_ref::<Element>() {
			element.children()
		} else if let Some(fragment) = node.dyn_ref::<DocumentFragment>() {
			fragment.children()
		} else {
			return Ok(Vec::new());
		};
		Ok((0..children.length()).filter_map(|i| children.item(i)).map(Into::into).collect())
	}

	fn tag_name(&self, node: &Node) -> Result<String> {
		node.dyn_ref::<Element>().map(Element::local_name).ok_or_else(|| not_an_element(node))
	}

	fn attribute(&self, node: &Node, name: &str) -> Option<String> {
		node.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<()> {
		node.dyn_ref::<Element>().ok_or_else(|| not_an_element(node))?.set_attribute(name, value).map_err(js_error)
	}

	fn inner_html(&self, node: &Node) -> Result<String> {
		if let Some(element) = node.dyn_ref::<Element>() {
			Ok(element.inner_html())
		} else if let Some(root) = node.dyn_ref::<ShadowRoot>() {
			Ok(root.inner_html())
		} else {
			Err(not_an_element(node))
		}
	}

	fn shallow_inner_html(&self, node: &Node) -> Result<String> {
		Ok(self.shallow_copy(node, false)?.inner_html())
	}

	fn element_skeleton(&self, node: &Node) -> Result<String> {
		Ok(self.shallow_copy(node, true)?.inner_html())
	}

	fn set_inner_html(&mut self, node: &Node, markup: &str) -> Result<()> {
		if let Some(element) = node.dyn_ref::<Element>() {
			element.set_inner_html(markup);
		} else if let Some(root) = node.dyn_ref::<ShadowRoot>() {
			root.set_inner_html(markup);
		} else {
			return Err(not_an_element(node));
		}
		Ok(())
	}

	fn replace_text_runs(&mut self, target: &Node, source: &Node) -> Result<()> {
		let elements = self.element_children(target)?;
		let mut runs = vec![Vec::new()];
		for child in collect_node_list(&source.child_nodes()) {
			if child.node_type() == Node::ELEMENT_NODE {
				runs.push(Vec::new());
			} else if let Some(run) = runs.last_mut() {
				run.push(child);
			}
		}
		if runs.len() != elements.len() + 1 {
			return Err(Error::Dom(format!("{:?} and {:?} have different numbers of element children", target.node_name(), source.node_name())));
		}

		for child in collect_node_list(&target.child_nodes()) {
			if child.node_type() != Node::ELEMENT_NODE {
				target.remove_child(&child).map_err(js_error)?;
			}
		}
		for (i, run) in runs.into_iter().enumerate() {
			for leaf in run {
				target.insert_before(&leaf.clone_node().map_err(js_error)?, elements.get(i)).map_err(js_error)?;
			}
		}
		Ok(())
	}

	fn query_all(&self, node: &Node, attribute: &str) -> Result<Vec<Node>> {
		let selector = attribute_selector(attribute);
		let list = if let Some(element) = node.dyn_ref::<Element>() {
			element.query_selector_all(&selector)
		} else if let Some(fragment) = node.dyn_ref::<DocumentFragment>() {
			fragment.query_selector_all(&selector)
		} else {
			return Err(not_an_element(node));
		};
		Ok(collect_node_list(&list.map_err(js_error)?))
	}

	fn value(&self, node: &Node) -> Option<String> {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			Some(input.value())
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			Some(text_area.value())
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			Some(select.value())
		} else {
			node.dyn_ref::<Element>().map(|element| element.get_attribute("value").unwrap_or_default())
		}
	}

	fn set_value(&mut self, node: &Node, value: &str) -> Result<()> {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value);
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value);
		} else {
			trace!("{:?} has no value to set.", node.node_name());
		}
		Ok(())
	}

	fn remove(&mut self, node: &Node) -> Result<()> {
		match node.dyn_ref::<Element>() {
			Some(element) => {
				element.remove();
				Ok(())
			}
			None => Err(not_an_element(node)),
		}
	}

	fn listen(&mut self, event: &str) -> Result<()> {
		if self.closures.contains(event) {
			return Ok(());
		}
		let sink = Rc::clone(&self.sink);
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| match &*sink.borrow() {
			Some(handler) => handler(event),
			None => trace!("Event {:?} arrived before the component was connected. Ignoring it.", event.type_()),
		}) as Box<dyn Fn(web_sys::Event)>);
		self.closures.publish(self.root.as_ref(), event, closure).map_err(js_error)
	}

	fn is_listening(&self, event: &str) -> bool {
		self.closures.contains(event)
	}
}

/// Mounts a component named `name` into a new shadow root on `host` and connects its native listeners.
///
/// # Errors
///
/// Iff `name` is not registered, the shadow root can't be attached or the first render fails.
#[instrument(skip(registry, host))]
pub fn mount(registry: &Registry<WebDom>, name: &str, host: &Element) -> Result<Rc<RefCell<Component<WebDom>>>> {
	let dom = WebDom::attach(host)?;
	let sink = Rc::clone(&dom.sink);
	let component = Rc::new(RefCell::new(registry.create(name, dom)?));

	let weak = Rc::downgrade(&component);
	*sink.borrow_mut() = Some(Box::new(move |event: web_sys::Event| {
		let component = match weak.upgrade() {
			Some(component) => component,
			None => return trace!("Event {:?} arrived after the component was dropped.", event.type_()),
		};
		let mut component = match component.try_borrow_mut() {
			Ok(component) => component,
			Err(_) => return warn!("Dropping re-entrant event {:?}.", event.type_()),
		};
		let target = event.target().and_then(|target| target.dyn_into::<Node>().ok());
		if let Err(error) = component.handle_event(&event.type_(), target.as_ref()) {
			error!("Handling {:?} failed: {}", event.type_(), error);
		}
	}));

	Ok(component)
}

/// Upgrades every element in `document` whose tag is a registered component name.
///
/// Only hosts present at call time are found. Hosts that already have a shadow root are left alone,
/// so calling this again after inserting new hosts mounts just those.
///
/// # Errors
///
/// Iff a query or a [`mount`] fails.
#[instrument(skip(registry, document))]
pub fn mount_all(registry: &Registry<WebDom>, document: &Document) -> Result<Vec<Rc<RefCell<Component<WebDom>>>>> {
	let mut mounted = Vec::new();
	for name in registry.names() {
		for host in collect_node_list(&document.query_selector_all(name).map_err(js_error)?) {
			match host.dyn_ref::<Element>() {
				Some(host) if host.shadow_root().is_some() => trace!("Skipping {:?} host that is already upgraded.", name),
				Some(host) => mounted.push(mount(registry, name, host)?),
				None => warn!("Skipping non-element match for {:?}.", name),
			}
		}
	}
	Ok(mounted)
}
