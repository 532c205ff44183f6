/// What the reconciler does when freshly rendered markup doesn't have the shape that was cached on first render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePolicy {
	/// Replace the whole mount point content and index it again, as on first render.
	///
	/// Elements removed by `:if` come back (and are evaluated again) after a re-cache.
	Recache,
	/// Keep matching by position. Elements whose index has no live counterpart are skipped,
	/// and shifted indices may update unrelated elements.
	///
	/// The mount point's own content is left alone on such a pass, so elements added at the top level don't appear.
	Skip,
}

impl Default for ShapePolicy {
	fn default() -> Self {
		Self::Recache
	}
}

/// Render configuration of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
	/// Elements nested deeper than this below the mount point are neither indexed nor reconciled.
	pub depth_limit: usize,
	pub shape_policy: ShapePolicy,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			depth_limit: 256,
			shape_policy: ShapePolicy::default(),
		}
	}
}

impl Options {
	#[must_use]
	pub fn with_depth_limit(self, depth_limit: usize) -> Self {
		Self { depth_limit, ..self }
	}

	#[must_use]
	pub fn with_shape_policy(self, shape_policy: ShapePolicy) -> Self {
		Self { shape_policy, ..self }
	}
}
