//! Minimal reactive components: a [`Template`] renders [`Attributes`] into markup,
//! and every later render is reconciled into the mount point in place, by position.
//!
//! The [`Dom`] trait abstracts the document. [`MemoryDom`] is always available,
//! and the `web` feature adds [`dom::web::WebDom`] around a browser `ShadowRoot`.

#![doc(html_root_url = "https://docs.rs/zephyr-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod attributes;
pub mod binding;
pub mod cache;
#[cfg(feature = "web")]
mod closure_map;
mod component;
mod definition;
pub mod diff;
pub mod dom;
mod error;
mod events;
pub mod expr;
mod options;
mod registry;
pub mod temp_map;
pub mod template;
mod value;

pub use attributes::{Attribute, Attributes};
pub use component::{Component, Phase};
pub use definition::{Definition, Listener, Listeners};
pub use diff::Outcome;
pub use dom::{Dom, MemoryDom, NodeId};
pub use error::{Error, Result};
pub use options::{Options, ShapePolicy};
pub use registry::{is_valid_name, Registry};
pub use template::Template;
pub use value::Value;
