//! First-render indexing of a mount point.

use crate::{dom::Dom, Options, Result};
use hashbrown::HashSet;
use tracing::{error, instrument, trace};

/// The positional marker attribute. Written by the engine only.
pub const INDEX: &str = ":index";

/// An element reached by [`walk`].
#[derive(Debug, Clone, PartialEq)]
pub struct Visit<N> {
	pub index: usize,
	/// 1 for children of the walked container.
	pub depth: usize,
	pub node: N,
}

/// The pre-order sequence of `(depth, tag name)` of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape(Vec<(usize, String)>);

impl Shape {
	/// # Errors
	///
	/// Iff a visited node can't be read.
	pub fn of<D: Dom>(dom: &D, visits: &[Visit<D::Node>]) -> Result<Self> {
		visits
			.iter()
			.map(|visit| -> Result<(usize, String)> { Ok((visit.depth, dom.tag_name(&visit.node)?)) })
			.collect::<Result<Vec<_>>>()
			.map(Self)
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

/// Visits the descendant elements of `container` depth-first in pre-order:
/// Each element is followed by its own subtree, then by its next sibling.
///
/// Indices count up from 0 in visiting order. Elements deeper than `depth_limit` are left out together with their subtrees.
///
/// # Errors
///
/// Iff the tree can't be read.
#[instrument(skip(dom, container))]
pub fn walk<D: Dom>(dom: &D, container: &D::Node, depth_limit: usize) -> Result<Vec<Visit<D::Node>>> {
	let mut visits = Vec::new();
	let mut stack: Vec<(usize, D::Node)> = dom.element_children(container)?.into_iter().rev().map(|node| (1, node)).collect();
	let mut truncated = false;

	while let Some((depth, node)) = stack.pop() {
		if depth > depth_limit {
			truncated = true;
			continue;
		}
		stack.extend(dom.element_children(&node)?.into_iter().rev().map(|child| (depth + 1, child)));
		visits.push(Visit {
			index: visits.len(),
			depth,
			node,
		});
	}

	if truncated {
		error!("Depth limit reached");
	}
	Ok(visits)
}

/// Writes each visit's index into its [`INDEX`] attribute.
///
/// # Errors
///
/// Iff an attribute can't be set.
pub fn tag<D: Dom>(dom: &mut D, visits: &[Visit<D::Node>]) -> Result<()> {
	for visit in visits {
		dom.set_attribute(&visit.node, INDEX, &visit.index.to_string())?;
	}
	Ok(())
}

/// What the first render recorded about a mount point.
#[derive(Debug, Clone, Default)]
pub struct Cached {
	pub shape: Shape,
	/// Indices of elements that `:if` removed from the live tree since the last cache.
	pub removed: HashSet<usize>,
}

/// Indexes the freshly rendered content of `root` and returns its shape.
///
/// # Errors
///
/// Iff the tree can't be read or tagged.
#[instrument(skip(dom, root))]
pub fn cache<D: Dom>(dom: &mut D, root: &D::Node, options: &Options) -> Result<Cached> {
	let visits = walk(dom, root, options.depth_limit)?;
	tag(dom, &visits)?;
	trace!("Cached {} element(s).", visits.len());
	Ok(Cached {
		shape: Shape::of(dom, &visits)?,
		removed: HashSet::new(),
	})
}

/// Reads back the positional index of a tagged element.
pub fn index_of<D: Dom>(dom: &D, node: &D::Node) -> Option<usize> {
	dom.attribute(node, INDEX)?.parse().ok()
}
