//! Post-render synchronization of `:bind` values and `:if` conditions.

use crate::{cache::index_of, dom::Dom, expr, Component, Error, Result, Value};
use tracing::{instrument, trace};

/// Two-way binds an input-like element to the named attribute.
pub const BIND: &str = ":bind";
/// Removes the element from the live tree when its expression is falsy.
pub const IF: &str = ":if";

/// Runs after every cache or update pass.
///
/// # Errors
///
/// Iff a DOM operation fails or a `:if` expression is malformed.
/// In the latter case no element is removed in this pass.
#[instrument(skip(component), fields(name = %component.name))]
pub fn apply<D: Dom>(component: &mut Component<D>) -> Result<()> {
	sync_values(component)?;
	evaluate_conditions(component)
}

fn sync_values<D: Dom>(component: &mut Component<D>) -> Result<()> {
	let root = component.dom.root();
	for node in component.dom.query_all(&root, BIND)? {
		let key = match component.dom.attribute(&node, BIND) {
			Some(key) => key,
			None => continue,
		};
		let value = match component.get(&key) {
			Value::Null => String::new(),
			value => value.to_string(),
		};
		component.dom.set_value(&node, &value)?;
	}
	Ok(())
}

fn evaluate_conditions<D: Dom>(component: &mut Component<D>) -> Result<()> {
	let root = component.dom.root();
	let mut falsy = Vec::new();
	for node in component.dom.query_all(&root, IF)? {
		let expression = component.dom.attribute(&node, IF).unwrap_or_default();
		let lookup = |key: &str| component.get(key);
		let keep = expr::test(&expression, &lookup).map_err(|source| Error::Condition { expression: expression.clone(), source })?;
		if !keep {
			falsy.push(node);
		}
	}

	for node in falsy {
		if let (Some(index), Some(cached)) = (index_of(&component.dom, &node), component.cached.as_mut()) {
			cached.removed.insert(index);
		}
		trace!("Removing {:?}.", node);
		component.dom.remove(&node)?;
	}
	Ok(())
}
