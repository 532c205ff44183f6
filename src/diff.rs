//! Position-based reconciliation of later renders against a cached mount point.

use crate::{
	cache::{self, index_of, tag, walk, Cached, Shape, Visit, INDEX},
	dom::Dom,
	temp_map::TempIndexMap,
	Options, Result, ShapePolicy,
};
use hashbrown::HashMap;
use tracing::{info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// What an [`update`] pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
	/// Live elements (or the mount point) whose content was replaced.
	pub replaced: usize,
	/// Live elements (or the mount point) whose text and comment children were replaced while their child elements stayed in place.
	pub text_updates: usize,
	/// Rendered elements without a live counterpart.
	pub skipped: usize,
	/// Whether the mount point was rendered and indexed from scratch.
	pub recached: bool,
}

/// Brings the live tree under [`Dom::root`] in line with `fragment`, a detached container holding the new markup.
///
/// `fragment` is walked like [`cache::cache`] walks the mount point, and every element in it is tagged with its index.
/// For each of them, the live element with the same index has its content replaced iff that content differs
/// and the difference isn't confined to element children that reconcile on their own.
/// Where only the text between unchanged child elements differs, just that text is replaced.
/// Content that is already identical is never touched.
///
/// Under [`ShapePolicy::Skip`], a changed shape leaves the mount point's own content as it is,
/// so rendered elements that have no live counterpart are counted in [`Outcome::skipped`] instead of inserted.
///
/// # Errors
///
/// Iff a DOM operation fails. The live tree may be partially updated in that case.
#[instrument(skip(dom, fragment, cached, lookup))]
pub fn update<D: Dom>(dom: &mut D, fragment: &D::Node, cached: &mut Cached, lookup: &mut TempIndexMap<D::Node>, options: &Options) -> Result<Outcome> {
	let root = dom.root();
	let visits = walk(dom, fragment, options.depth_limit)?;
	let shape = Shape::of(dom, &visits)?;

	if shape != cached.shape {
		match options.shape_policy {
			ShapePolicy::Recache => {
				info!("Rendered shape changed from {} to {} element(s). Re-caching the mount point.", cached.shape.len(), shape.len());
				let markup = dom.inner_html(fragment)?;
				dom.set_inner_html(&root, &markup)?;
				*cached = cache::cache(dom, &root, options)?;
				return Ok(Outcome {
					replaced: 1,
					recached: true,
					..Outcome::default()
				});
			}
			ShapePolicy::Skip => warn!("Rendered shape changed from {} to {} element(s). Matching by position anyway.", cached.shape.len(), shape.len()),
		}
	}
	let same_shape = shape == cached.shape;

	tag(dom, &visits)?;
	let visits = prune_removed(dom, visits, cached)?;

	let live = lookup.temp();
	index_live(dom, &root, live)?;

	let mut outcome = Outcome::default();
	if same_shape {
		outcome.record(reconcile(dom, &root, fragment, options.depth_limit > 0, live)?);
	}

	for visit in &visits {
		let span = trace_span!("Reconciling element", index = visit.index, depth = visit.depth);
		let _enter = span.enter();

		let target = match live.get(&visit.index) {
			Some(target) => target.clone(),
			None => {
				trace!("No live element carries this index. Skipping.");
				outcome.skipped += 1;
				continue;
			}
		};

		outcome.record(reconcile(dom, &target, &visit.node, visit.depth < options.depth_limit, live)?);
	}

	info!("Index lookup capacity: {}", lookup.capacity());
	if STATIC_MAX_LEVEL >= Level::WARN && outcome.skipped > 0 && options.shape_policy == ShapePolicy::Skip {
		warn!("{} rendered element(s) had no live counterpart.", outcome.skipped);
	}
	Ok(outcome)
}

/// Detaches the elements `:if` removed from the live tree from `fragment` too, so both sides compare equal where nothing else changed.
fn prune_removed<D: Dom>(dom: &mut D, visits: Vec<Visit<D::Node>>, cached: &Cached) -> Result<Vec<Visit<D::Node>>> {
	if cached.removed.is_empty() {
		return Ok(visits);
	}

	let mut kept = Vec::with_capacity(visits.len());
	let mut pruned_depth = None;
	for visit in visits {
		if let Some(depth) = pruned_depth {
			if visit.depth > depth {
				continue;
			}
			pruned_depth = None;
		}
		if cached.removed.contains(&visit.index) {
			trace!("Pruning removed element {} from the rendered markup.", visit.index);
			dom.remove(&visit.node)?;
			pruned_depth = Some(visit.depth);
			continue;
		}
		kept.push(visit);
	}
	Ok(kept)
}

/// Records all tagged elements below `node`. The first element in document order wins for duplicate indices.
fn index_live<D: Dom>(dom: &D, node: &D::Node, live: &mut HashMap<usize, D::Node>) -> Result<()> {
	for element in dom.query_all(node, INDEX)? {
		match index_of(dom, &element) {
			Some(index) => {
				live.entry(index).or_insert(element);
			}
			None => warn!("Ignoring malformed positional marker on {:?}.", element),
		}
	}
	Ok(())
}

enum Change {
	None,
	Text,
	Content,
}

impl Outcome {
	fn record(&mut self, change: Change) {
		match change {
			Change::None => (),
			Change::Text => self.text_updates += 1,
			Change::Content => self.replaced += 1,
		}
	}
}

/// Brings the content of `target` in line with that of `source`.
fn reconcile<D: Dom>(dom: &mut D, target: &D::Node, source: &D::Node, may_descend: bool, live: &mut HashMap<usize, D::Node>) -> Result<Change> {
	let expected = dom.inner_html(source)?;
	let found = dom.inner_html(target)?;
	if found == expected {
		return Ok(Change::None);
	}

	if may_descend {
		if dom.shallow_inner_html(target)? == dom.shallow_inner_html(source)? {
			trace!("Differences are confined to child elements.");
			return Ok(Change::None);
		}

		// Leaves are cheaper to replace whole.
		let skeleton = dom.element_skeleton(target)?;
		if !skeleton.is_empty() && skeleton == dom.element_skeleton(source)? {
			trace!("Replacing text around unchanged child elements.");
			dom.replace_text_runs(target, source)?;
			return Ok(Change::Text);
		}
	}

	if cfg!(feature = "dangerous-logging") {
		trace!(%found, %expected, "Replacing content.");
	} else {
		trace!(found.len = found.len(), expected.len = expected.len(), "Replacing content.");
	}

	for stale in dom.query_all(target, INDEX)? {
		if let Some(index) = index_of(dom, &stale) {
			live.remove(&index);
		}
	}
	dom.set_inner_html(target, &expected)?;
	index_live(dom, target, live)?;
	Ok(Change::Content)
}
