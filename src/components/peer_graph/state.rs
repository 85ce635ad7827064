//! Layout simulation state for the peer graph.
//!
//! Wraps the `force_graph` physics simulation with per-node drawing metadata.
//! The simulation graph is rebuilt from the [`GraphModel`] on every reconcile,
//! carrying positions over by peer id, so the model stays the single source of
//! truth. Graph coordinates are centered on the origin; the renderer and hit
//! testing translate by half the surface size.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::model::GraphModel;
use super::scale::{LayoutParams, NodeMetrics};
use super::style::{Color, GraphStyle};

const NODE_MASS: f32 = 10.0;
const SEED_RADIUS: f64 = 100.0;
/// Fraction of the rest-length error corrected per tick at full heat.
const LINK_RATE: f64 = 0.1;
const GRAVITY: f64 = 0.02;
const HEAT_DECAY: f64 = 0.99;
const MIN_HEAT: f64 = 0.005;
const RESUME_HEAT: f64 = 0.1;
/// Angle between consecutive seed positions; irrational in turns so slots never repeat.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
/// Pointer travel (pixels) below which a press and release count as a click.
pub const CLICK_SLOP: f64 = 3.0;

/// Per-node drawing metadata attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub name: String,
	pub color: Color,
	pub metrics: NodeMetrics,
	pub opacity: f64,
}

/// A link as drawn, resolved against the current simulation graph.
#[derive(Clone, Debug)]
pub struct LinkInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub width: f64,
	pub opacity: f64,
	pub distance: f64,
	pub strength: f64,
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer leaves the click slop.
	pub moved: bool,
}

/// The hovered peer and its neighbourhood.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub children: HashSet<String>,
	pub parents: HashSet<String>,
}

/// Simulation plus interaction state, rebuilt on reconcile and advanced each frame.
pub struct LayoutState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub links: Vec<LinkInfo>,
	pub drag: DragState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	/// Layout temperature; link and gravity forces fade with it.
	pub heat: f64,
	pub animation_running: bool,
	index: HashMap<String, DefaultNodeIdx>,
	/// Seed slots handed out so far.
	seeded: usize,
	/// Links present while a peer was focused; drawn at rest opacity once
	/// focus clears.
	rested: HashSet<(String, String)>,
}

fn simulation_parameters(params: &LayoutParams) -> SimulationParameters {
	SimulationParameters {
		force_charge: (150.0 * params.scale) as f32,
		force_spring: 0.02,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

/// Starting position for the `n`th peer ever seeded, on a ring around the origin.
fn seed_position(n: usize, scale: f64) -> (f32, f32) {
	let angle = (n as f64 * GOLDEN_ANGLE) % TAU;
	let r = SEED_RADIUS * scale;
	((r * angle.cos()) as f32, (r * angle.sin()) as f32)
}

impl LayoutState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(simulation_parameters(&LayoutParams::new(0, false))),
			links: Vec::new(),
			drag: DragState::default(),
			hover: HoverState::default(),
			width,
			height,
			heat: 0.0,
			animation_running: false,
			index: HashMap::new(),
			seeded: 0,
			rested: HashSet::new(),
		}
	}

	/// Rebuilds the simulation from the model and restarts the layout.
	pub fn reconcile(&mut self, model: &GraphModel, style: &GraphStyle) {
		let nodes = model.list();
		let focused = model.focused();
		let params = LayoutParams::new(nodes.len(), focused.is_some());
		if focused.is_some() {
			self.rested = model
				.links()
				.iter()
				.map(|l| (l.source.clone(), l.target.clone()))
				.collect();
		} else {
			self.rested.retain(|(s, t)| model.get_link(s, t).is_some());
		}

		let mut previous: HashMap<String, (f32, f32, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});

		let mut graph = ForceGraph::new(simulation_parameters(&params));
		let mut index = HashMap::new();
		let mut active = HashMap::new();

		for node in nodes {
			let is_active = model.is_active(&node.id);
			let (x, y, is_anchor) = previous.get(&node.id).copied().unwrap_or_else(|| {
				let (x, y) = seed_position(self.seeded, params.scale);
				self.seeded += 1;
				(x, y, false)
			});
			let opacity = if is_active {
				1.0
			} else {
				style.node.dimmed_opacity
			};
			// Keep some mass on dimmed peers so they still repel a little.
			let mass = NODE_MASS * (0.3 + 0.7 * params.charge_ratio(is_active) as f32);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass,
				is_anchor,
				user_data: NodeInfo {
					id: node.id.clone(),
					name: node.name.clone(),
					color: style.node.color(node),
					metrics: NodeMetrics::new(node, style, params.scale),
					opacity,
				},
			});
			index.insert(node.id.clone(), idx);
			active.insert(node.id.as_str(), is_active);
		}

		let mut links = Vec::with_capacity(model.links().len());
		for link in model.links() {
			let (Some(&source), Some(&target)) = (index.get(&link.source), index.get(&link.target))
			else {
				continue;
			};
			let both_active = active[link.source.as_str()] && active[link.target.as_str()];
			let touches_focus = focused.is_some_and(|f| link.touches(f));
			let strength = params.link_strength(touches_focus);
			let rested = self
				.rested
				.contains(&(link.source.clone(), link.target.clone()));
			let opacity = match (focused.is_some(), both_active) {
				(true, true) => style.link.active_opacity,
				(true, false) => style.link.dimmed_opacity,
				(false, _) if rested => style.link.rest_opacity,
				(false, _) => style.link.opacity,
			};
			if strength > 0.0 {
				graph.add_edge(source, target, EdgeData::default());
			}
			links.push(LinkInfo {
				source,
				target,
				width: style.link.width(link.width),
				opacity,
				distance: params.link_distance(both_active),
				strength,
			});
		}

		self.graph = graph;
		self.links = links;
		self.index = index;

		if self
			.drag
			.node
			.as_ref()
			.is_some_and(|id| !self.index.contains_key(id))
		{
			self.drag = DragState::default();
		}
		let hovered = self
			.hover
			.node
			.take()
			.filter(|id| self.index.contains_key(id));
		self.set_hover(hovered, model);

		self.restart();
	}

	/// Reheats the layout fully.
	pub fn restart(&mut self) {
		self.heat = 1.0;
		self.animation_running = true;
	}

	/// Reheats the layout gently, keeping positions continuous.
	pub fn resume(&mut self) {
		self.heat = self.heat.max(RESUME_HEAT);
		self.animation_running = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.resume();
	}

	pub fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index.get(id).copied()
	}

	/// Position of every node, keyed by simulation index.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(sx - self.width / 2.0, sy - self.height / 2.0)
	}

	/// Id of the topmost peer under a surface position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() <= node.data.user_data.metrics.radius {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	/// Updates the hovered peer and recomputes its children and parents.
	pub fn set_hover(&mut self, node: Option<String>, model: &GraphModel) {
		self.hover.children.clear();
		self.hover.parents.clear();
		if let Some(id) = &node {
			self.hover
				.children
				.extend(model.children(id).into_iter().map(str::to_string));
			self.hover
				.parents
				.extend(model.parents(id).into_iter().map(str::to_string));
		}
		self.hover.node = node;
	}

	/// Starts dragging the peer under `(sx, sy)`, if any. Returns whether a
	/// drag began.
	pub fn begin_drag(&mut self, sx: f64, sy: f64) -> bool {
		let Some(id) = self.node_at_position(sx, sy) else {
			return false;
		};
		let Some(idx) = self.node_index(&id) else {
			return false;
		};
		let mut start = (0.0, 0.0);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				start = (node.x(), node.y());
				node.data.is_anchor = true;
			}
		});
		self.drag = DragState {
			node: Some(id),
			start_x: sx,
			start_y: sy,
			node_start_x: start.0,
			node_start_y: start.1,
			moved: false,
		};
		self.resume();
		true
	}

	/// Moves the dragged peer with the pointer.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node.as_deref().and_then(|id| self.node_index(id)) else {
			return;
		};
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
			self.drag.moved = true;
		}
		if !self.drag.moved {
			return;
		}
		let (nx, ny) = (
			self.drag.node_start_x + dx as f32,
			self.drag.node_start_y + dy as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
			}
		});
		self.resume();
	}

	/// Releases the dragged peer. Returns its id and whether it moved.
	pub fn end_drag(&mut self) -> Option<(String, bool)> {
		let drag = std::mem::take(&mut self.drag);
		let id = drag.node?;
		if let Some(idx) = self.node_index(&id) {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
				}
			});
		}
		Some((id, drag.moved))
	}

	/// Advances the simulation by `dt` seconds while the layout is warm.
	pub fn tick(&mut self, dt: f32) {
		if !self.animation_running {
			return;
		}
		self.graph.update(dt);
		self.apply_link_forces();
		self.heat *= HEAT_DECAY;
		if self.heat < MIN_HEAT && self.drag.node.is_none() {
			self.heat = 0.0;
			self.animation_running = false;
		}
	}

	/// Pulls linked peers toward their rest distance and everything toward
	/// the center, scaled by the current heat.
	fn apply_link_forces(&mut self) {
		let positions = self.positions();
		let mut shift: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();

		for link in &self.links {
			if link.strength <= 0.0 {
				continue;
			}
			let (Some(&(x1, y1)), Some(&(x2, y2))) =
				(positions.get(&link.source), positions.get(&link.target))
			else {
				continue;
			};
			let (dx, dy) = (x2 - x1, y2 - y1);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < 0.001 {
				continue;
			}
			let k = (dist - link.distance) / dist * link.strength * self.heat * LINK_RATE * 0.5;
			let s = shift.entry(link.source).or_default();
			s.0 += dx * k;
			s.1 += dy * k;
			let t = shift.entry(link.target).or_default();
			t.0 -= dx * k;
			t.1 -= dy * k;
		}

		let pull = GRAVITY * self.heat;
		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			let (sx, sy) = shift.get(&node.index()).copied().unwrap_or_default();
			let (x, y) = (node.data.x as f64, node.data.y as f64);
			node.data.x = (x + sx - x * pull) as f32;
			node.data.y = (y + sy - y * pull) as f32;
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::peer_graph::types::PeerNode;

	fn model() -> GraphModel {
		let mut model = GraphModel::default();
		model.add(PeerNode::local("You", "You")).unwrap();
		model.add(PeerNode::new("Thing1", "192.168.1.20")).unwrap();
		model.add(PeerNode::new("Thing2", "192.168.1.44")).unwrap();
		model.connect("You", "Thing1").unwrap();
		model
	}

	fn position_of(state: &LayoutState, id: &str) -> (f64, f64) {
		let idx = state.node_index(id).unwrap();
		state.positions()[&idx]
	}

	#[test]
	fn reconcile_mirrors_model() {
		let style = GraphStyle::default();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model(), &style);
		assert_eq!(state.positions().len(), 3);
		assert_eq!(state.links.len(), 1);
		assert_eq!(state.links[0].width, 0.7);
		assert_eq!(state.links[0].opacity, 0.5);
		assert!(state.animation_running);
	}

	#[test]
	fn reconcile_keeps_positions_by_id() {
		let style = GraphStyle::default();
		let mut model = model();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model, &style);
		for _ in 0..10 {
			state.tick(0.016);
		}
		let before = position_of(&state, "Thing2");

		model.remove("Thing1").unwrap();
		state.reconcile(&model, &style);
		assert_eq!(position_of(&state, "Thing2"), before);
		assert!(state.node_index("Thing1").is_none());
		assert!(state.links.is_empty());
	}

	#[test]
	fn focus_dims_unrelated() {
		let style = GraphStyle::default();
		let mut model = model();
		model.connect("Thing2", "Thing1").unwrap();
		model.click("You").unwrap();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model, &style);

		let mut opacity = HashMap::new();
		state.graph.visit_nodes(|node| {
			opacity.insert(node.data.user_data.id.clone(), node.data.user_data.opacity);
		});
		assert_eq!(opacity["You"], 1.0);
		assert_eq!(opacity["Thing1"], 1.0);
		assert_eq!(opacity["Thing2"], 0.2);

		let you_link = &state.links[0];
		assert_eq!(you_link.opacity, 1.0);
		assert_eq!(you_link.strength, 1.0);
		let other = &state.links[1];
		assert_eq!(other.opacity, 0.02);
		assert_eq!(other.strength, 0.0);
		assert_eq!(other.distance, 60.0);

		model.click("You").unwrap();
		state.reconcile(&model, &style);
		assert!(state.links.iter().all(|l| l.opacity == 0.3));

		// Links made after focus cleared enter at the normal opacity.
		model.connect("Thing1", "Thing2").unwrap();
		state.reconcile(&model, &style);
		assert_eq!(state.links[2].opacity, 0.5);
		assert_eq!(state.links[0].opacity, 0.3);

		// So does a rested link that is dropped and made again.
		model.disconnect("You", "Thing1").unwrap();
		state.reconcile(&model, &style);
		model.connect("You", "Thing1").unwrap();
		state.reconcile(&model, &style);
		assert_eq!(state.links.last().unwrap().opacity, 0.5);
	}

	#[test]
	fn new_peers_never_land_on_existing_ones() {
		let style = GraphStyle::default();
		let mut model = GraphModel::default();
		let mut state = LayoutState::new(800.0, 400.0);
		for id in ["A", "B", "C"] {
			model.add(PeerNode::new(id, id)).unwrap();
			state.reconcile(&model, &style);
		}
		model.remove("A").unwrap();
		state.reconcile(&model, &style);
		model.add(PeerNode::new("D", "D")).unwrap();
		state.reconcile(&model, &style);

		let distinct = |state: &LayoutState| {
			let points: Vec<_> = state.positions().into_values().collect();
			points.iter().enumerate().all(|(i, a)| {
				points[i + 1..]
					.iter()
					.all(|b| (a.0 - b.0).abs() > 1.0 || (a.1 - b.1).abs() > 1.0)
			})
		};
		assert!(distinct(&state));
		for _ in 0..3000 {
			state.tick(0.016);
		}
		assert!(distinct(&state));
		assert_ne!(position_of(&state, "C"), position_of(&state, "D"));
	}

	#[test]
	fn hit_testing_uses_node_radius() {
		let style = GraphStyle::default();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model(), &style);
		let (x, y) = position_of(&state, "You");
		let (sx, sy) = (x + 400.0, y + 200.0);
		assert_eq!(state.node_at_position(sx, sy).as_deref(), Some("You"));
		assert_eq!(state.node_at_position(sx + 14.0, sy).as_deref(), Some("You"));
		assert_eq!(state.node_at_position(-1000.0, -1000.0), None);
	}

	#[test]
	fn hover_tracks_neighbourhood() {
		let style = GraphStyle::default();
		let mut model = model();
		model.connect("Thing2", "You").unwrap();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model, &style);
		state.set_hover(Some("You".into()), &model);
		assert!(state.hover.children.contains("Thing1"));
		assert!(state.hover.parents.contains("Thing2"));

		model.remove("You").unwrap();
		state.reconcile(&model, &style);
		assert_eq!(state.hover.node, None);
		assert!(state.hover.children.is_empty());
	}

	#[test]
	fn press_without_motion_is_a_click() {
		let style = GraphStyle::default();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model(), &style);
		let (x, y) = position_of(&state, "Thing2");
		let (sx, sy) = (x + 400.0, y + 200.0);

		assert!(state.begin_drag(sx, sy));
		state.drag_to(sx + 1.0, sy);
		assert_eq!(state.end_drag(), Some(("Thing2".to_string(), false)));

		assert!(state.begin_drag(sx, sy));
		state.drag_to(sx + 40.0, sy);
		assert_eq!(state.end_drag(), Some(("Thing2".to_string(), true)));
		let (nx, _) = position_of(&state, "Thing2");
		assert!((nx - (x + 40.0)).abs() < 1e-3);

		assert!(!state.begin_drag(-1000.0, -1000.0));
		assert_eq!(state.end_drag(), None);
	}

	#[test]
	fn resize_resumes_without_restart() {
		let style = GraphStyle::default();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model(), &style);
		state.heat = 0.0;
		state.animation_running = false;
		state.resize(600.0, 250.0);
		assert_eq!((state.width, state.height), (600.0, 250.0));
		assert!(state.animation_running);
		assert_eq!(state.heat, RESUME_HEAT);
	}

	#[test]
	fn layout_cools_down() {
		let style = GraphStyle::default();
		let mut state = LayoutState::new(800.0, 400.0);
		state.reconcile(&model(), &style);
		for _ in 0..2000 {
			state.tick(0.016);
		}
		assert!(!state.animation_running);
	}
}
