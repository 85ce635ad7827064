//! Peer, link and event types exchanged with the peer graph widget.

use serde::{Deserialize, Serialize};

/// A participant in the swarm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerNode {
	/// Unique identifier for this peer. Used to reference peers in links.
	pub id: String,
	/// Marks the local peer. Drawn larger, in its own color, with a bigger label.
	#[serde(default)]
	pub me: bool,
	/// Display label (typically an address).
	pub name: String,
	/// Whether the peer is currently seeding. Affects color only.
	#[serde(default)]
	pub seeder: bool,
}

impl PeerNode {
	/// A remote, non-seeding peer.
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			me: false,
			name: name.into(),
			seeder: false,
		}
	}

	/// The local peer.
	pub fn local(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			me: true,
			..Self::new(id, name)
		}
	}
}

/// A directed connection between two peers.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Source peer id.
	pub source: String,
	/// Target peer id.
	pub target: String,
	/// Stroke width derived from the last observed rate, if any.
	pub width: Option<f64>,
}

impl Link {
	pub(crate) fn new(source: &str, target: &str) -> Self {
		Self {
			source: source.to_string(),
			target: target.to_string(),
			width: None,
		}
	}

	/// True if this link runs from `source` to `target`.
	pub fn joins(&self, source: &str, target: &str) -> bool {
		self.source == source && self.target == target
	}

	/// True if either endpoint is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Selection change emitted when a peer is clicked or the focused peer goes away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	/// The peer with this id became focused.
	Selected(String),
	/// Nothing is focused anymore.
	Cleared,
}

impl Selection {
	/// The selected id, or `None` on deselection.
	pub fn id(&self) -> Option<&str> {
		match self {
			Selection::Selected(id) => Some(id),
			Selection::Cleared => None,
		}
	}
}

/// A link entry of a [`GraphSnapshot`].
#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotLink {
	/// Source peer id.
	pub source: String,
	/// Target peer id.
	pub target: String,
	/// Optional throughput in bytes per second.
	#[serde(default)]
	pub rate: Option<f64>,
}

/// Initial swarm contents, typically embedded in the page as JSON.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphSnapshot {
	/// Peers to add, in order.
	#[serde(default)]
	pub peers: Vec<PeerNode>,
	/// Links to connect once all peers exist.
	#[serde(default)]
	pub links: Vec<SnapshotLink>,
}
