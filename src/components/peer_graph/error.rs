//! Errors raised by the peer graph.

use std::fmt;

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Which end of a link an id was supplied for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	/// The peer a link starts at.
	Source,
	/// The peer a link points to.
	Target,
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Endpoint::Source => f.write_str("source"),
			Endpoint::Target => f.write_str("target"),
		}
	}
}

/// Failure of a single widget call. The model is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	/// A peer with the same id is already present.
	#[error("add: cannot add duplicate node")]
	DuplicateNode,

	/// The id passed to a single-peer operation is unknown.
	#[error("{op}: node does not exist")]
	MissingNode { op: &'static str },

	/// One end of a link operation names an unknown peer.
	#[error("{op}: invalid {end} id")]
	InvalidEndpoint { op: &'static str, end: Endpoint },

	/// The directed link already exists.
	#[error("connect: cannot make duplicate connection")]
	DuplicateLink,

	/// The directed link does not exist.
	#[error("{op}: connection does not exist")]
	MissingLink { op: &'static str },

	/// Rates must be finite and non-negative.
	#[error("rate: rate must be a non-negative number, got {0}")]
	InvalidRate(f64),

	/// A color string in the style configuration could not be parsed.
	#[error("invalid color: {0}")]
	InvalidColor(String),

	/// The browser environment refused an operation.
	#[error("dom: {0}")]
	Dom(String),

	/// The widget was torn down with `destroy`.
	#[error("graph has been destroyed")]
	Destroyed,
}

impl GraphError {
	/// Wraps a thrown JS value.
	pub fn from_js(value: JsValue) -> Self {
		GraphError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
	}

	pub(crate) fn dom(msg: impl Into<String>) -> Self {
		GraphError::Dom(msg.into())
	}
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		GraphError::from_js(value)
	}
}

/// Result alias for peer graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_operation_and_precondition() {
		assert_eq!(
			GraphError::DuplicateNode.to_string(),
			"add: cannot add duplicate node"
		);
		assert_eq!(
			GraphError::InvalidEndpoint {
				op: "connect",
				end: Endpoint::Target
			}
			.to_string(),
			"connect: invalid target id"
		);
		assert_eq!(
			GraphError::MissingLink { op: "disconnect" }.to_string(),
			"disconnect: connection does not exist"
		);
		assert_eq!(
			GraphError::MissingNode { op: "seed" }.to_string(),
			"seed: node does not exist"
		);
	}
}
