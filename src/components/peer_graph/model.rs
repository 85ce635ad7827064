//! In-memory swarm model behind the widget.
//!
//! Holds peers and directed links in insertion order and enforces every
//! precondition of the public API before mutating anything. Links reference
//! peers by id, so removing a peer never re-wires unrelated links.
//!
//! Selection changes are queued rather than dispatched so the widget can
//! release its borrow of the model before running subscriber callbacks.

use log::debug;

use super::error::{Endpoint, GraphError, Result};
use super::style::LinkStyle;
use super::types::{GraphSnapshot, Link, PeerNode, Selection};

/// Peers, links and the focused peer.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	nodes: Vec<PeerNode>,
	links: Vec<Link>,
	focused: Option<String>,
	events: Vec<Selection>,
	link_style: LinkStyle,
}

impl GraphModel {
	/// Empty model using `link_style` for the rate-to-width mapping.
	pub fn new(link_style: LinkStyle) -> Self {
		Self {
			link_style,
			..Self::default()
		}
	}

	/// Peers in insertion order.
	pub fn list(&self) -> &[PeerNode] {
		&self.nodes
	}

	/// Links in insertion order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Id of the focused peer, if any.
	pub fn focused(&self) -> Option<&str> {
		self.focused.as_deref()
	}

	/// The peer with this id.
	pub fn node(&self, id: &str) -> Option<&PeerNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	fn node_index(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	fn link_index(&self, source: &str, target: &str) -> Option<usize> {
		self.links.iter().position(|l| l.joins(source, target))
	}

	fn require(&self, id: &str, op: &'static str, end: Endpoint) -> Result<()> {
		match self.node(id) {
			Some(_) => Ok(()),
			None => Err(GraphError::InvalidEndpoint { op, end }),
		}
	}

	fn require_pair(&self, source: &str, target: &str, op: &'static str) -> Result<()> {
		self.require(source, op, Endpoint::Source)?;
		self.require(target, op, Endpoint::Target)
	}

	/// Appends a peer.
	pub fn add(&mut self, node: PeerNode) -> Result<()> {
		debug!("add {} {:?}", node.id, node);
		if self.node(&node.id).is_some() {
			return Err(GraphError::DuplicateNode);
		}
		self.nodes.push(node);
		Ok(())
	}

	/// Removes a peer and every link touching it.
	///
	/// Removing the focused peer clears focus and queues one
	/// [`Selection::Cleared`].
	pub fn remove(&mut self, id: &str) -> Result<()> {
		debug!("remove {}", id);
		let index = self
			.node_index(id)
			.ok_or(GraphError::MissingNode { op: "remove" })?;

		if self.focused.as_deref() == Some(id) {
			self.focused = None;
			self.events.push(Selection::Cleared);
		}

		self.nodes.remove(index);
		self.links.retain(|l| !l.touches(id));
		Ok(())
	}

	/// Adds the directed link `source -> target`.
	pub fn connect(&mut self, source: &str, target: &str) -> Result<()> {
		debug!("connect {} {}", source, target);
		self.require_pair(source, target, "connect")?;
		if self.link_index(source, target).is_some() {
			return Err(GraphError::DuplicateLink);
		}
		self.links.push(Link::new(source, target));
		Ok(())
	}

	/// Removes the directed link `source -> target`.
	pub fn disconnect(&mut self, source: &str, target: &str) -> Result<()> {
		debug!("disconnect {} {}", source, target);
		self.require_pair(source, target, "disconnect")?;
		let index = self
			.link_index(source, target)
			.ok_or(GraphError::MissingLink { op: "disconnect" })?;
		self.links.remove(index);
		Ok(())
	}

	/// Records the throughput of `source -> target` as a stroke width.
	pub fn rate(&mut self, source: &str, target: &str, bytes_per_sec: f64) -> Result<()> {
		debug!("rate update: {}<->{} at {}", source, target, bytes_per_sec);
		if !bytes_per_sec.is_finite() || bytes_per_sec < 0.0 {
			return Err(GraphError::InvalidRate(bytes_per_sec));
		}
		self.require_pair(source, target, "rate")?;
		let index = self
			.link_index(source, target)
			.ok_or(GraphError::MissingLink { op: "rate" })?;
		let width = self.link_style.rate_to_width(bytes_per_sec);
		self.links[index].width = Some(width);
		debug!("rate: {}", width);
		Ok(())
	}

	/// Sets the seeder flag of a peer.
	pub fn seed(&mut self, id: &str, is_seeding: bool) -> Result<()> {
		debug!("{} isSeeding: {}", id, is_seeding);
		let index = self
			.node_index(id)
			.ok_or(GraphError::MissingNode { op: "seed" })?;
		self.nodes[index].seeder = is_seeding;
		Ok(())
	}

	/// Marks a link as choked. Currently has no visual effect.
	pub fn choke(&mut self, source: &str, target: &str) {
		debug!("choke {} {}", source, target);
	}

	/// Marks a link as unchoked. Currently has no visual effect.
	pub fn unchoke(&mut self, source: &str, target: &str) {
		debug!("unchoke {} {}", source, target);
	}

	/// True if every id names a peer. An empty list is trivially true.
	pub fn has_peer<S: AsRef<str>>(&self, ids: &[S]) -> bool {
		debug!("has_peer {:?}", ids.iter().map(AsRef::as_ref).collect::<Vec<_>>());
		ids.iter().all(|id| self.node(id.as_ref()).is_some())
	}

	/// True if the directed link `source -> target` exists.
	pub fn has_link(&self, source: &str, target: &str) -> Result<bool> {
		self.require_pair(source, target, "hasLink")?;
		Ok(self.link_index(source, target).is_some())
	}

	/// True if the peers are linked in either direction.
	pub fn are_connected(&self, source: &str, target: &str) -> Result<bool> {
		self.require_pair(source, target, "areConnected")?;
		Ok(self.link_index(source, target).is_some() || self.link_index(target, source).is_some())
	}

	/// The directed link `source -> target`, if present.
	pub fn get_link(&self, source: &str, target: &str) -> Option<&Link> {
		self.links.iter().find(|l| l.joins(source, target))
	}

	/// Ids this peer links to.
	pub fn children(&self, id: &str) -> Vec<&str> {
		self.links
			.iter()
			.filter(|l| l.source == id)
			.map(|l| l.target.as_str())
			.collect()
	}

	/// Ids linking to this peer.
	pub fn parents(&self, id: &str) -> Vec<&str> {
		self.links
			.iter()
			.filter(|l| l.target == id)
			.map(|l| l.source.as_str())
			.collect()
	}

	/// True if `a` and `b` are the same peer or share a link in either direction.
	pub fn connected(&self, a: &str, b: &str) -> bool {
		a == b || self.links.iter().any(|l| l.joins(a, b) || l.joins(b, a))
	}

	/// Whether a peer is drawn at full weight: always when nothing is focused,
	/// otherwise only when connected to the focused peer.
	pub fn is_active(&self, id: &str) -> bool {
		match &self.focused {
			Some(focused) => self.connected(focused, id),
			None => true,
		}
	}

	/// Toggles focus on a peer, as a click does.
	///
	/// Clicking the focused peer clears focus; clicking any other peer moves
	/// focus to it. Queues the matching [`Selection`].
	pub fn click(&mut self, id: &str) -> Result<()> {
		debug!("click {}", id);
		if self.node(id).is_none() {
			return Err(GraphError::MissingNode { op: "select" });
		}
		if self.focused.as_deref() == Some(id) {
			self.focused = None;
			self.events.push(Selection::Cleared);
		} else {
			self.focused = Some(id.to_string());
			self.events.push(Selection::Selected(id.to_string()));
		}
		Ok(())
	}

	/// Adds every peer then connects (and rates) every link of a snapshot.
	///
	/// All or nothing: the snapshot is applied to a copy that replaces the
	/// model only if every step succeeds.
	pub fn load(&mut self, snapshot: GraphSnapshot) -> Result<()> {
		let mut staged = self.clone();
		for peer in snapshot.peers {
			staged.add(peer)?;
		}
		for link in snapshot.links {
			staged.connect(&link.source, &link.target)?;
			if let Some(rate) = link.rate {
				staged.rate(&link.source, &link.target, rate)?;
			}
		}
		*self = staged;
		Ok(())
	}

	/// Drains queued selection events.
	pub fn take_events(&mut self) -> Vec<Selection> {
		std::mem::take(&mut self.events)
	}

	/// Drops all peers, links and focus.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
		self.focused = None;
		self.events.clear();
	}
}
