use super::Dom;
use crate::{Error, Result};
use hashbrown::HashSet;
use html5ever::{namespace_url, ns, Attribute, LocalName, QualName};
use tracing::{instrument, trace, warn};

mod html;

use html::Extent;

/// A generational handle into a [`MemoryDom`].
///
/// Handles to removed nodes go stale and are never reused for different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
	index: u32,
	generation: u32,
}

#[derive(Debug)]
enum NodeData {
	Container,
	Element {
		name: QualName,
		attributes: Vec<Attribute>,
		/// The live value of input-like elements. Not serialized, like the DOM property it models.
		value: Option<String>,
	},
	Text(String),
	Comment(String),
}

#[derive(Debug)]
struct Entry {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug)]
struct Slot {
	generation: u32,
	entry: Option<Entry>,
}

/// An arena-backed document with a single container as mount point.
///
/// Markup is parsed with `html5ever`'s fragment algorithm and serialized with its HTML serializer,
/// so trees and markup come out as a browser would produce them.
///
/// Beyond [`Dom`], it counts content mutations ([`MemoryDom::mutations`]) and can simulate user input via [`Dom::set_value`].
#[derive(Debug)]
pub struct MemoryDom {
	slots: Vec<Slot>,
	free: Vec<u32>,
	root: NodeId,
	listening: HashSet<String>,
	mutations: usize,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

fn stale(node: NodeId) -> Error {
	Error::Dom(format!("Stale node handle {:?}", node))
}

fn not_an_element(node: NodeId) -> Error {
	Error::Dom(format!("{:?} is not an element", node))
}

impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		let mut this = Self {
			slots: Vec::new(),
			free: Vec::new(),
			root: NodeId { index: 0, generation: 0 },
			listening: HashSet::new(),
			mutations: 0,
		};
		this.root = this.allocate(NodeData::Container);
		this
	}

	/// The number of content replacements and removals performed so far within the mount point's tree.
	#[must_use]
	pub fn mutations(&self) -> usize {
		self.mutations
	}

	/// Whether `node` is alive and part of the mount point's tree.
	#[must_use]
	pub fn is_connected(&self, node: NodeId) -> bool {
		let mut current = node;
		loop {
			if current == self.root {
				return true;
			}
			match self.entry(current) {
				Ok(Entry { parent: Some(parent), .. }) => current = *parent,
				_ => return false,
			}
		}
	}

	/// Whether `node` refers to a live (not yet removed) node.
	#[must_use]
	pub fn contains(&self, node: NodeId) -> bool {
		self.entry(node).is_ok()
	}

	/// The first descendant element of `node` for which `attribute` equals `value`.
	#[must_use]
	pub fn find(&self, node: NodeId, attribute: &str, value: &str) -> Option<NodeId> {
		self.descendant_elements(node).ok()?.into_iter().find(|&element| self.attribute(&element, attribute).as_deref() == Some(value))
	}

	/// The first descendant element of `node` with the local name `name`.
	#[must_use]
	pub fn find_tag(&self, node: NodeId, name: &str) -> Option<NodeId> {
		self.descendant_elements(node)
			.ok()?
			.into_iter()
			.find(|element| matches!(self.entry(*element), Ok(Entry { data: NodeData::Element { name: n, .. }, .. }) if &*n.local == name))
	}

	/// Concatenated text of all descendant text nodes.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	pub fn text_content(&self, node: NodeId) -> Result<String> {
		let mut text = String::new();
		self.collect_text(node, &mut text)?;
		Ok(text)
	}

	/// `node` serialized including its own tags.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	pub fn outer_html(&self, node: NodeId) -> Result<String> {
		html::serialize_node(self, node)
	}

	fn collect_text(&self, node: NodeId, text: &mut String) -> Result<()> {
		let entry = self.entry(node)?;
		if let NodeData::Text(data) = &entry.data {
			text.push_str(data);
		}
		for &child in &entry.children {
			self.collect_text(child, text)?;
		}
		Ok(())
	}

	fn allocate(&mut self, data: NodeData) -> NodeId {
		let entry = Entry {
			data,
			parent: None,
			children: Vec::new(),
		};
		match self.free.pop() {
			Some(index) => {
				let slot = &mut self.slots[index as usize];
				slot.entry = Some(entry);
				NodeId { index, generation: slot.generation }
			}
			None => {
				#[allow(clippy::cast_possible_truncation)]
				let index = self.slots.len() as u32;
				self.slots.push(Slot { generation: 0, entry: Some(entry) });
				NodeId { index, generation: 0 }
			}
		}
	}

	/// Frees `node` and its subtree. The caller is responsible for unlinking it from its parent first.
	fn release(&mut self, node: NodeId) {
		let mut pending = vec![node];
		while let Some(node) = pending.pop() {
			if let Some(slot) = self.slots.get_mut(node.index as usize) {
				if slot.generation != node.generation {
					continue;
				}
				if let Some(entry) = slot.entry.take() {
					slot.generation = slot.generation.wrapping_add(1);
					self.free.push(node.index);
					pending.extend(entry.children);
				}
			}
		}
	}

	fn entry(&self, node: NodeId) -> Result<&Entry> {
		self.slots
			.get(node.index as usize)
			.filter(|slot| slot.generation == node.generation)
			.and_then(|slot| slot.entry.as_ref())
			.ok_or_else(|| stale(node))
	}

	fn entry_mut(&mut self, node: NodeId) -> Result<&mut Entry> {
		self.slots
			.get_mut(node.index as usize)
			.filter(|slot| slot.generation == node.generation)
			.and_then(|slot| slot.entry.as_mut())
			.ok_or_else(|| stale(node))
	}

	fn is_element(&self, node: NodeId) -> bool {
		matches!(self.entry(node), Ok(Entry { data: NodeData::Element { .. }, .. }))
	}

	fn descendant_elements(&self, node: NodeId) -> Result<Vec<NodeId>> {
		let mut elements = Vec::new();
		let mut stack: Vec<NodeId> = self.entry(node)?.children.iter().rev().copied().collect();
		while let Some(node) = stack.pop() {
			let entry = self.entry(node)?;
			if let NodeData::Element { .. } = entry.data {
				elements.push(node);
				stack.extend(entry.children.iter().rev().copied());
			}
		}
		Ok(elements)
	}

	/// Detaches `node` from its parent, if any. The subtree stays allocated.
	fn unlink(&mut self, node: NodeId) -> Result<()> {
		if let Some(parent) = self.entry_mut(node)?.parent.take() {
			self.entry_mut(parent)?.children.retain(|&child| child != node);
		}
		Ok(())
	}

	/// Moves `child` under `parent`, before `before` or at the end.
	fn insert(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<()> {
		self.unlink(child)?;
		let siblings = &mut self.entry_mut(parent)?.children;
		let position = before.and_then(|before| siblings.iter().position(|&sibling| sibling == before)).unwrap_or(siblings.len());
		siblings.insert(position, child);
		self.entry_mut(child)?.parent = Some(parent);
		Ok(())
	}

	/// Moves all children of `node` to the end of `new_parent`.
	fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
		let children = core::mem::take(&mut self.entry_mut(node)?.children);
		for &child in &children {
			self.entry_mut(child)?.parent = Some(new_parent);
		}
		self.entry_mut(new_parent)?.children.extend(children);
		Ok(())
	}

	/// A parentless copy of a text or comment node.
	fn copy_leaf(&mut self, node: NodeId) -> Result<NodeId> {
		let data = match &self.entry(node)?.data {
			NodeData::Text(text) => NodeData::Text(text.clone()),
			NodeData::Comment(comment) => NodeData::Comment(comment.clone()),
			_ => return Err(Error::Dom(format!("{:?} is not a text or comment node", node))),
		};
		Ok(self.allocate(data))
	}

	/// The fragment parsing context for markup assigned to `node`.
	fn context(&self, node: NodeId) -> Result<QualName> {
		Ok(match &self.entry(node)?.data {
			NodeData::Element { name, .. } => name.clone(),
			_ => QualName::new(None, ns!(html), LocalName::from("div")),
		})
	}
}

impl Dom for MemoryDom {
	type Node = NodeId;

	fn root(&self) -> NodeId {
		self.root
	}

	#[instrument(skip(self, markup), fields(markup.len = markup.len()))]
	fn parse_detached(&mut self, markup: &str) -> Result<NodeId> {
		let context = self.context(self.root)?;
		html::parse_fragment(self, context, markup)
	}

	fn discard(&mut self, node: &NodeId) {
		if *node == self.root {
			return warn!("Refusing to discard the mount point.");
		}
		if self.unlink(*node).is_ok() {
			self.release(*node);
		}
	}

	fn element_children(&self, node: &NodeId) -> Result<Vec<NodeId>> {
		let entry = self.entry(*node)?;
		Ok(entry.children.iter().copied().filter(|&child| self.is_element(child)).collect())
	}

	fn tag_name(&self, node: &NodeId) -> Result<String> {
		match &self.entry(*node)?.data {
			NodeData::Element { name, .. } => Ok(name.local.to_string()),
			_ => Err(not_an_element(*node)),
		}
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		match &self.entry(*node).ok()?.data {
			NodeData::Element { attributes, .. } => attributes.iter().find(|attribute| &*attribute.name.local == name).map(|attribute| attribute.value.to_string()),
			_ => None,
		}
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<()> {
		if name.is_empty() || name.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=')) {
			return Err(Error::Dom(format!("Invalid attribute name {:?}", name)));
		}
		match &mut self.entry_mut(*node)?.data {
			NodeData::Element { attributes, .. } => {
				match attributes.iter_mut().find(|attribute| &*attribute.name.local == name) {
					Some(existing) => existing.value = value.into(),
					None => attributes.push(Attribute {
						name: QualName::new(None, ns!(), LocalName::from(name)),
						value: value.into(),
					}),
				}
				Ok(())
			}
			_ => Err(not_an_element(*node)),
		}
	}

	fn inner_html(&self, node: &NodeId) -> Result<String> {
		html::serialize_children(self, *node, Extent::Deep)
	}

	fn shallow_inner_html(&self, node: &NodeId) -> Result<String> {
		html::serialize_children(self, *node, Extent::Shallow)
	}

	fn element_skeleton(&self, node: &NodeId) -> Result<String> {
		html::serialize_children(self, *node, Extent::Skeleton)
	}

	#[instrument(skip(self, markup), fields(markup.len = markup.len()))]
	fn set_inner_html(&mut self, node: &NodeId, markup: &str) -> Result<()> {
		let context = self.context(*node)?;
		let fragment = html::parse_fragment(self, context, markup)?;
		let connected = self.is_connected(*node);

		let previous = core::mem::take(&mut self.entry_mut(*node)?.children);
		for child in previous {
			self.release(child);
		}
		self.reparent_children(fragment, *node)?;
		self.release(fragment);

		if connected {
			self.mutations += 1;
		}
		Ok(())
	}

	fn replace_text_runs(&mut self, target: &NodeId, source: &NodeId) -> Result<()> {
		let elements = self.element_children(target)?;
		let mut runs = vec![Vec::new()];
		for &child in &self.entry(*source)?.children {
			if self.is_element(child) {
				runs.push(Vec::new());
			} else if let Some(run) = runs.last_mut() {
				run.push(child);
			}
		}
		if runs.len() != elements.len() + 1 {
			return Err(Error::Dom(format!("{:?} and {:?} have different numbers of element children", target, source)));
		}

		for child in core::mem::take(&mut self.entry_mut(*target)?.children) {
			if !elements.contains(&child) {
				self.release(child);
			}
		}
		let mut children = Vec::new();
		for (i, run) in runs.into_iter().enumerate() {
			for leaf in run {
				let copy = self.copy_leaf(leaf)?;
				self.entry_mut(copy)?.parent = Some(*target);
				children.push(copy);
			}
			if let Some(&element) = elements.get(i) {
				children.push(element);
			}
		}
		self.entry_mut(*target)?.children = children;

		if self.is_connected(*target) {
			self.mutations += 1;
		}
		Ok(())
	}

	fn query_all(&self, node: &NodeId, attribute: &str) -> Result<Vec<NodeId>> {
		Ok(self.descendant_elements(*node)?.into_iter().filter(|element| self.attribute(element, attribute).is_some()).collect())
	}

	fn value(&self, node: &NodeId) -> Option<String> {
		match &self.entry(*node).ok()?.data {
			NodeData::Element { value: Some(value), .. } => Some(value.clone()),
			NodeData::Element { name, .. } if &*name.local == "textarea" => self.text_content(*node).ok(),
			NodeData::Element { .. } => Some(self.attribute(node, "value").unwrap_or_default()),
			_ => None,
		}
	}

	fn set_value(&mut self, node: &NodeId, new_value: &str) -> Result<()> {
		match &mut self.entry_mut(*node)?.data {
			NodeData::Element { value, .. } => {
				*value = Some(new_value.to_owned());
				Ok(())
			}
			_ => Err(not_an_element(*node)),
		}
	}

	fn remove(&mut self, node: &NodeId) -> Result<()> {
		if !self.contains(*node) {
			trace!("{:?} is already gone.", node);
			return Ok(());
		}
		if *node == self.root {
			return Err(Error::Dom("The mount point can't be removed".to_owned()));
		}
		let connected = self.is_connected(*node);
		self.unlink(*node)?;
		self.release(*node);
		if connected {
			self.mutations += 1;
		}
		Ok(())
	}

	fn listen(&mut self, event: &str) -> Result<()> {
		if !self.listening.insert(event.to_owned()) {
			trace!("Already listening for {:?}.", event);
		}
		Ok(())
	}

	fn is_listening(&self, event: &str) -> bool {
		self.listening.contains(event)
	}
}
