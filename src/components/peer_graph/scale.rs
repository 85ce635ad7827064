//! Node-count and focus dependent sizing for the peer graph.
//!
//! As the swarm grows past [`DENSITY_THRESHOLD`] peers every size and distance
//! shrinks by a shared factor so the drawing stays readable. Layout forces also
//! depend on focus: while a peer is focused its neighbourhood pulls together
//! and everything else loosens and fades.
//!
//! Charges follow the usual force-layout convention: negative values repel.

use super::style::GraphStyle;
use super::types::PeerNode;

/// Node count up to which no shrinking is applied.
pub const DENSITY_THRESHOLD: usize = 10;
/// Floor of the shrink factor.
pub const MIN_DENSITY_SCALE: f64 = 0.2;

const CHARGE: f64 = -200.0;
const FOCUS_CHARGE: f64 = -100.0;
const UNFOCUSED_CHARGE: f64 = -5.0;
const LINK_DISTANCE: f64 = 100.0;
const LOOSE_LINK_DISTANCE: f64 = 60.0;

/// Shared shrink factor for a graph of `node_count` peers.
///
/// `1.0` below the threshold, then one percent smaller per extra peer, never
/// below [`MIN_DENSITY_SCALE`].
pub fn density_scale(node_count: usize) -> f64 {
	if node_count < DENSITY_THRESHOLD {
		return 1.0;
	}
	let extra = (node_count - DENSITY_THRESHOLD) as f64;
	(1.0 - extra / 100.0).max(MIN_DENSITY_SCALE)
}

/// Scaled drawing metrics of a single peer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeMetrics {
	/// Circle radius.
	pub radius: f64,
	/// Label font size.
	pub font_size: f64,
	/// Vertical label offset from the node center.
	pub label_offset: f64,
}

impl NodeMetrics {
	/// Metrics of `node` under density factor `scale`.
	pub fn new(node: &PeerNode, style: &GraphStyle, scale: f64) -> Self {
		let (radius, font_size, label_offset) = if node.me {
			(style.node.me_radius, style.text.me_size, style.text.me_offset)
		} else {
			(style.node.radius, style.text.size, style.text.offset)
		};
		Self {
			radius: radius * scale,
			font_size: font_size * scale,
			label_offset: label_offset * scale,
		}
	}
}

/// Force parameters for one layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
	/// Density scale factor applied to every value.
	pub scale: f64,
	/// Whether a peer is focused.
	pub focused: bool,
}

impl LayoutParams {
	/// Parameters for a graph of `node_count` peers.
	pub fn new(node_count: usize, focused: bool) -> Self {
		Self {
			scale: density_scale(node_count),
			focused,
		}
	}

	/// Charge of a peer; `active` is ignored without focus.
	pub fn charge(&self, active: bool) -> f64 {
		let base = match (self.focused, active) {
			(false, _) => CHARGE,
			(true, true) => FOCUS_CHARGE,
			(true, false) => UNFOCUSED_CHARGE,
		};
		base * self.scale
	}

	/// Rest length of a link whose ends are both active (or not).
	pub fn link_distance(&self, both_active: bool) -> f64 {
		let base = if !self.focused || both_active {
			LINK_DISTANCE
		} else {
			LOOSE_LINK_DISTANCE
		};
		base * self.scale
	}

	/// Spring strength of a link; only links touching the focused peer pull
	/// while focus is held.
	pub fn link_strength(&self, touches_focus: bool) -> f64 {
		match (self.focused, touches_focus) {
			(false, _) => 1.0,
			(true, true) => self.scale,
			(true, false) => 0.0,
		}
	}

	/// Charge relative to the unfocused baseline, in `0.0..=1.0`.
	pub fn charge_ratio(&self, active: bool) -> f64 {
		self.charge(active) / (CHARGE * self.scale)
	}
}
