use hashbrown::HashMap;

/// Scratch lookup from positional index to live node, kept between update passes to reuse its allocation.
#[derive(Debug)]
pub struct TempIndexMap<N>(HashMap<usize, N>);

impl<N> Default for TempIndexMap<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> TempIndexMap<N> {
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// The collection is cleared before each borrow, so no entries leak between passes.
	pub fn temp(&mut self) -> &mut HashMap<usize, N> {
		self.0.clear();
		&mut self.0
	}

	/// Retrieves the map's capacity without clearing it first.
	#[must_use]
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}
