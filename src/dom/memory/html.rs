//! `html5ever` glue: a tree sink that builds into the arena and a serializer view onto it.

use super::{Entry, MemoryDom, NodeData, NodeId};
use crate::{Error, Result};
use html5ever::{
	namespace_url, ns,
	serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope},
	tendril::{StrTendril, TendrilSink},
	tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink},
	Attribute, ExpandedName, LocalName, ParseOpts, QualName,
};
use std::{borrow::Cow, io};
use tracing::trace;

/// Parses `markup` as the content of an element named `context` into a new detached container.
///
/// Like `innerHTML`, this never fails on malformed markup. Errors are recovered from the way browsers do.
pub(super) fn parse_fragment(dom: &mut MemoryDom, context: QualName, markup: &str) -> Result<NodeId> {
	let document = dom.allocate(NodeData::Container);
	let sink = Sink {
		dom,
		document,
		created: Vec::new(),
		fallback: QualName::new(None, ns!(html), LocalName::from("div")),
		error: None,
	};
	html5ever::parse_fragment(sink, ParseOpts::default(), context, Vec::new()).one(markup)
}

struct Sink<'a> {
	dom: &'a mut MemoryDom,
	document: NodeId,
	/// Everything allocated while parsing, so that nodes the tree builder dropped can be freed.
	created: Vec<NodeId>,
	fallback: QualName,
	error: Option<Error>,
}

impl Sink<'_> {
	fn record(&mut self, result: Result<()>) {
		if let Err(error) = result {
			self.error.get_or_insert(error);
		}
	}

	fn allocate(&mut self, data: NodeData) -> NodeId {
		let node = self.dom.allocate(data);
		self.created.push(node);
		node
	}

	fn insert(&mut self, parent: NodeId, child: NodeOrText<NodeId>, before: Option<NodeId>) -> Result<()> {
		match child {
			NodeOrText::AppendNode(node) => self.dom.insert(parent, node, before),
			NodeOrText::AppendText(text) => {
				let siblings = &self.dom.entry(parent)?.children;
				let previous = match before {
					Some(before) => siblings.iter().position(|&sibling| sibling == before).and_then(|i| i.checked_sub(1)).map(|i| siblings[i]),
					None => siblings.last().copied(),
				};
				if let Some(previous) = previous {
					if let NodeData::Text(existing) = &mut self.dom.entry_mut(previous)?.data {
						existing.push_str(&text);
						return Ok(());
					}
				}
				let node = self.allocate(NodeData::Text(text.to_string()));
				self.dom.insert(parent, node, before)
			}
		}
	}

	/// Fragment parsing builds below an `html` element. Its children become the container's.
	fn hoist(&mut self) -> Result<()> {
		let wrappers = self.dom.entry(self.document)?.children.clone();
		for wrapper in wrappers {
			self.dom.unlink(wrapper)?;
			self.dom.reparent_children(wrapper, self.document)?;
		}
		Ok(())
	}
}

impl TreeSink for Sink<'_> {
	type Handle = NodeId;
	type Output = Result<NodeId>;

	fn finish(mut self) -> Result<NodeId> {
		let result = match self.error.take() {
			Some(error) => Err(error),
			None => self.hoist(),
		};
		for node in core::mem::take(&mut self.created) {
			if matches!(self.dom.entry(node), Ok(Entry { parent: None, .. })) {
				self.dom.release(node);
			}
		}
		match result {
			Ok(()) => Ok(self.document),
			Err(error) => {
				self.dom.release(self.document);
				Err(error)
			}
		}
	}

	fn parse_error(&mut self, message: Cow<'static, str>) {
		trace!("Recovering from markup error: {}", message);
	}

	fn get_document(&mut self) -> NodeId {
		self.document
	}

	fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
		match self.dom.entry(*target) {
			Ok(Entry { data: NodeData::Element { name, .. }, .. }) => name.expanded(),
			_ => self.fallback.expanded(),
		}
	}

	fn create_element(&mut self, name: QualName, attributes: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
		self.allocate(NodeData::Element { name, attributes, value: None })
	}

	fn create_comment(&mut self, text: StrTendril) -> NodeId {
		self.allocate(NodeData::Comment(text.to_string()))
	}

	fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> NodeId {
		self.allocate(NodeData::Comment(format!("?{} {}", target, data)))
	}

	fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
		let result = self.insert(*parent, child, None);
		self.record(result);
	}

	fn append_based_on_parent_node(&mut self, element: &NodeId, prev_element: &NodeId, child: NodeOrText<NodeId>) {
		let has_parent = matches!(self.dom.entry(*element), Ok(Entry { parent: Some(_), .. }));
		if has_parent {
			self.append_before_sibling(element, child);
		} else {
			self.append(prev_element, child);
		}
	}

	fn append_doctype_to_document(&mut self, name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {
		trace!("Ignoring doctype {:?} in fragment.", &*name);
	}

	fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
		*target
	}

	fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
		x == y
	}

	fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

	fn append_before_sibling(&mut self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
		let result = match self.dom.entry(*sibling) {
			Ok(Entry { parent: Some(parent), .. }) => {
				let parent = *parent;
				self.insert(parent, new_node, Some(*sibling))
			}
			Ok(_) => Err(Error::Dom(format!("{:?} has no parent to insert into", sibling))),
			Err(error) => Err(error),
		};
		self.record(result);
	}

	fn add_attrs_if_missing(&mut self, target: &NodeId, new_attributes: Vec<Attribute>) {
		if let Ok(Entry { data: NodeData::Element { attributes, .. }, .. }) = self.dom.entry_mut(*target) {
			for attribute in new_attributes {
				if !attributes.iter().any(|existing| existing.name == attribute.name) {
					attributes.push(attribute);
				}
			}
		}
	}

	fn remove_from_parent(&mut self, target: &NodeId) {
		let result = self.dom.unlink(*target);
		self.record(result);
	}

	fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
		let result = self.dom.reparent_children(*node, *new_parent);
		self.record(result);
	}
}

/// How much of a node's content [`serialize_children`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Extent {
	Deep,
	/// Child elements are written without their content.
	Shallow,
	/// Like [`Extent::Shallow`], and text and comment children are left out.
	Skeleton,
}

struct Subtree<'a> {
	dom: &'a MemoryDom,
	node: NodeId,
	extent: Extent,
}

fn io_error(error: &Error) -> io::Error {
	io::Error::new(io::ErrorKind::NotFound, error.to_string())
}

impl Subtree<'_> {
	fn entry(&self, node: NodeId) -> io::Result<&Entry> {
		self.dom.entry(node).map_err(|error| io_error(&error))
	}

	fn write<S: Serializer>(&self, serializer: &mut S, node: NodeId, descend: bool) -> io::Result<()> {
		let entry = self.entry(node)?;
		match &entry.data {
			NodeData::Element { name, attributes, .. } => {
				serializer.start_elem(name.clone(), attributes.iter().map(|attribute| (&attribute.name, &*attribute.value)))?;
				if descend {
					for &child in &entry.children {
						self.write(serializer, child, true)?;
					}
				}
				serializer.end_elem(name.clone())
			}
			NodeData::Container => {
				for &child in &entry.children {
					self.write(serializer, child, descend)?;
				}
				Ok(())
			}
			NodeData::Text(text) => serializer.write_text(text),
			NodeData::Comment(comment) => serializer.write_comment(comment),
		}
	}
}

impl Serialize for Subtree<'_> {
	fn serialize<S: Serializer>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()> {
		match traversal_scope {
			TraversalScope::IncludeNode => self.write(serializer, self.node, true),
			TraversalScope::ChildrenOnly(_) => {
				for &child in &self.entry(self.node)?.children {
					match self.extent {
						Extent::Deep => self.write(serializer, child, true)?,
						Extent::Shallow => self.write(serializer, child, false)?,
						Extent::Skeleton if self.dom.is_element(child) => self.write(serializer, child, false)?,
						Extent::Skeleton => (),
					}
				}
				Ok(())
			}
		}
	}
}

fn to_markup(subtree: &Subtree<'_>, traversal_scope: TraversalScope) -> Result<String> {
	let mut bytes = Vec::new();
	serialize(
		&mut bytes,
		subtree,
		SerializeOpts {
			traversal_scope,
			..SerializeOpts::default()
		},
	)
	.map_err(|error| Error::Dom(error.to_string()))?;
	String::from_utf8(bytes).map_err(|error| Error::Dom(error.to_string()))
}

/// The content of `node` as markup, escaped for its context.
pub(super) fn serialize_children(dom: &MemoryDom, node: NodeId, extent: Extent) -> Result<String> {
	let context = match &dom.entry(node)?.data {
		NodeData::Element { name, .. } => Some(name.clone()),
		_ => None,
	};
	to_markup(&Subtree { dom, node, extent }, TraversalScope::ChildrenOnly(context))
}

pub(super) fn serialize_node(dom: &MemoryDom, node: NodeId) -> Result<String> {
	dom.entry(node)?;
	to_markup(&Subtree { dom, node, extent: Extent::Deep }, TraversalScope::IncludeNode)
}
