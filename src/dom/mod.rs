//! The document operations the render engine needs, and the backends that provide them.
//!
//! A [`Dom`] owns exactly one mount point ([`Dom::root`]), the isolated subtree a component renders into.
//! It can also hold detached trees parsed from markup, which the reconciler reads and then [discards](`Dom::discard`).

use crate::Result;
use core::fmt::Debug;

mod memory;
#[cfg(feature = "web")]
pub mod web;

pub use memory::{MemoryDom, NodeId};

pub trait Dom {
	/// A handle to an element, text node or container.
	///
	/// Equality is identity: Two handles are equal iff they refer to the same node.
	type Node: Clone + PartialEq + Debug;

	/// The mount point. Created once and never replaced.
	fn root(&self) -> Self::Node;

	/// Parses `markup` into a fresh container that is not connected to [`Dom::root`].
	///
	/// Malformed markup is recovered from the way `innerHTML` does, in the context of the mount point.
	///
	/// # Errors
	///
	/// Iff the backend can't allocate the container.
	fn parse_detached(&mut self, markup: &str) -> Result<Self::Node>;

	/// Releases a container returned by [`Dom::parse_detached`].
	fn discard(&mut self, node: &Self::Node);

	/// The element children of `node`, in document order.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn element_children(&self, node: &Self::Node) -> Result<Vec<Self::Node>>;

	/// The lower-case local name of an element.
	///
	/// # Errors
	///
	/// Iff `node` is not an element.
	fn tag_name(&self, node: &Self::Node) -> Result<String>;

	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

	/// # Errors
	///
	/// Iff `node` is not an element or `name` is not a valid attribute name.
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

	/// Serialized content of `node`.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn inner_html(&self, node: &Self::Node) -> Result<String>;

	/// Like [`Dom::inner_html`], but element children are serialized as empty elements, with only their own tags and attributes.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn shallow_inner_html(&self, node: &Self::Node) -> Result<String>;

	/// Only the element children of `node`, serialized like in [`Dom::shallow_inner_html`].
	///
	/// Two nodes with equal skeletons differ at most in their text and comment children.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn element_skeleton(&self, node: &Self::Node) -> Result<String>;

	/// Replaces the content of `node`, parsed in the context of `node`.
	///
	/// # Errors
	///
	/// Iff `node` is stale. The content stays unchanged in that case.
	fn set_inner_html(&mut self, node: &Self::Node, markup: &str) -> Result<()>;

	/// Replaces the text and comment children of `target` with copies of those of `source`.
	///
	/// Element children of `target` stay in place, and the runs between them are matched by position.
	///
	/// # Errors
	///
	/// Iff either node is stale or they don't have the same number of element children.
	fn replace_text_runs(&mut self, target: &Self::Node, source: &Self::Node) -> Result<()>;

	/// All descendant elements of `node` that carry the attribute `name`, in document order.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn query_all(&self, node: &Self::Node, attribute: &str) -> Result<Vec<Self::Node>>;

	/// The current value of an input-like element. [`None`] for other nodes.
	fn value(&self, node: &Self::Node) -> Option<String>;

	/// Sets the displayed value of an input-like element.
	///
	/// # Errors
	///
	/// Iff `node` is stale.
	fn set_value(&mut self, node: &Self::Node, value: &str) -> Result<()>;

	/// Removes `node` from its parent. Removing a node that is already gone does nothing.
	///
	/// # Errors
	///
	/// Iff the backend rejects the operation.
	fn remove(&mut self, node: &Self::Node) -> Result<()>;

	/// Installs a native listener for `event` on the mount point.
	///
	/// # Errors
	///
	/// Iff the backend rejects the listener.
	fn listen(&mut self, event: &str) -> Result<()>;

	fn is_listening(&self, event: &str) -> bool;
}
