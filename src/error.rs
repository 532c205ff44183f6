use crate::expr::ExprError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Could not evaluate `:if` expression {expression:?}: {source}")]
	Condition {
		expression: String,
		#[source]
		source: ExprError,
	},

	#[error("DOM operation failed: {0}")]
	Dom(String),

	#[error("No component named {0:?} is registered")]
	UnknownComponent(String),

	#[error("Listener for {event:?} failed: {message}")]
	Listener { event: String, message: String },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
