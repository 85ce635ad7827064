//! Imperative peer graph widget mounted into a host container.
//!
//! [`PeerGraph`] appends a canvas to the container and owns everything hanging
//! off it: the model, the layout simulation, the `requestAnimationFrame` loop,
//! pointer listeners on the canvas and a debounced window resize listener.
//! Every mutation validates against the model, reconciles the layout and only
//! then, with all internal borrows released, notifies selection subscribers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, Window};

use super::debounce::Debouncer;
use super::error::{GraphError, Result};
use super::model::GraphModel;
use super::render;
use super::session::{Bound, Session};
use super::state::LayoutState;
use super::style::GraphStyle;
use super::types::{GraphSnapshot, Link, PeerNode, Selection};

const FRAME_DT: f32 = 0.016;
const MOUSE_EVENTS: [&str; 4] = ["mousedown", "mousemove", "mouseup", "mouseleave"];

/// Everything that dies with the widget.
struct Mounted {
	model: GraphModel,
	layout: LayoutState,
	style: GraphStyle,
	root: Element,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl Bound for Mounted {
	fn model(&self) -> &GraphModel {
		&self.model
	}

	fn model_mut(&mut self) -> &mut GraphModel {
		&mut self.model
	}

	/// Reconciles the layout with the model.
	fn update(&mut self) {
		self.layout.reconcile(&self.model, &self.style);
	}
}

impl Mounted {
	/// Re-reads the container size and resumes the layout.
	fn resize(&mut self, window: &Window) {
		let (width, height) = surface_size(window, &self.root, &self.style);
		self.canvas.set_width(width as u32);
		self.canvas.set_height(height as u32);
		self.layout.resize(width, height);
		debug!("resize {}x{}", width, height);
	}

	fn pointer(&self, ev: &MouseEvent) -> (f64, f64) {
		let rect = self.canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}
}

/// Container width and the height tier for the current viewport.
fn surface_size(window: &Window, root: &Element, style: &GraphStyle) -> (f64, f64) {
	let viewport = window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or_default();
	(
		root.client_width() as f64,
		style.surface.height_for(viewport),
	)
}

/// Live peer-to-peer swarm visualization bound to a container element.
///
/// ```ignore
/// let graph = PeerGraph::from_selector(".torrent-graph")?;
/// graph.add(PeerNode::local("You", "You"))?;
/// graph.add(PeerNode::new("Thing1", "192.168.1.20"))?;
/// graph.connect("You", "Thing1")?;
/// graph.rate("You", "Thing1", 150_000.0)?;
/// ```
pub struct PeerGraph {
	window: Window,
	session: Session<Mounted>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame: Rc<Cell<Option<i32>>>,
	resize_debounce: Rc<Debouncer>,
	resize_cb: Closure<dyn FnMut()>,
	mouse_cbs: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
}

impl PeerGraph {
	/// Mounts a graph with the default style into `root`.
	pub fn new(root: &Element) -> Result<Self> {
		Self::with_style(root, GraphStyle::default())
	}

	/// Mounts a graph into the first element matching `selector`.
	pub fn from_selector(selector: &str) -> Result<Self> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| GraphError::dom("no document"))?;
		let root = document
			.query_selector(selector)?
			.ok_or_else(|| GraphError::dom(format!("no element matches {selector}")))?;
		Self::new(&root)
	}

	/// Mounts a graph styled by `style` into `root`.
	pub fn with_style(root: &Element, style: GraphStyle) -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| GraphError::dom("no window"))?;
		let document = window
			.document()
			.ok_or_else(|| GraphError::dom("no document"))?;

		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| GraphError::dom("canvas element has unexpected type"))?;
		canvas.set_class_name("peer-graph-canvas");
		canvas.style().set_property("display", "block")?;
		root.append_child(&canvas)?;

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or_else(|| GraphError::dom("2d context unavailable"))?
			.dyn_into()
			.map_err(|_| GraphError::dom("2d context has unexpected type"))?;

		let (width, height) = surface_size(&window, root, &style);
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let model = GraphModel::new(style.link.clone());
		let mut layout = LayoutState::new(width, height);
		layout.reconcile(&model, &style);

		let session = Session::new(Mounted {
			model,
			layout,
			style: style.clone(),
			root: root.clone(),
			canvas: canvas.clone(),
			ctx,
		});

		let (session_resize, window_resize) = (session.clone(), window.clone());
		let resize_debounce = Rc::new(Debouncer::new(
			window.clone(),
			style.surface.resize_debounce_ms,
			move || {
				session_resize.with(|m| m.resize(&window_resize));
			},
		));
		let debounce_trigger = resize_debounce.clone();
		let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
			if let Err(e) = debounce_trigger.trigger() {
				warn!("resize: {}", e);
			}
		});
		window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())?;

		let mut graph = Self {
			window,
			session,
			animate: Rc::new(RefCell::new(None)),
			frame: Rc::new(Cell::new(None)),
			resize_debounce,
			resize_cb,
			mouse_cbs: Vec::new(),
		};
		graph.attach_pointer(&canvas)?;
		graph.start_animation()?;
		info!("peer graph mounted ({}x{})", width, height);
		Ok(graph)
	}

	fn attach_pointer(&mut self, canvas: &HtmlCanvasElement) -> Result<()> {
		for event in MOUSE_EVENTS {
			let session = self.session.clone();
			let cb: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
				session.with(|m| on_pointer(m, event, &ev));
			});
			canvas.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
			self.mouse_cbs.push((event, cb));
		}
		Ok(())
	}

	fn start_animation(&self) -> Result<()> {
		let (session, animate_inner, frame, window) = (
			self.session.clone(),
			self.animate.clone(),
			self.frame.clone(),
			self.window.clone(),
		);
		*self.animate.borrow_mut() = Some(Closure::new(move || {
			frame.set(None);
			let drawn = session.with(|m| {
				m.layout.tick(FRAME_DT);
				render::render(&m.layout, &m.ctx, &m.style);
			});
			if drawn.is_none() {
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					Ok(id) => frame.set(Some(id)),
					Err(e) => warn!("animation stopped: {:?}", e),
				}
			}
		}));
		if let Some(ref cb) = *self.animate.borrow() {
			let id = self
				.window
				.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.frame.set(Some(id));
		}
		Ok(())
	}

	/// Subscribes to selection changes.
	pub fn on_select(&self, callback: impl Fn(&Selection) + 'static) {
		self.session.subscribe(callback);
	}

	/// Peers in insertion order. Empty once destroyed.
	pub fn list(&self) -> Vec<PeerNode> {
		debug!("list");
		self.session
			.query(|model| model.list().to_vec())
			.unwrap_or_default()
	}

	/// Adds a peer.
	pub fn add(&self, node: PeerNode) -> Result<()> {
		self.session.mutate(|model| model.add(node))
	}

	/// Removes a peer and its links.
	pub fn remove(&self, id: &str) -> Result<()> {
		self.session.mutate(|model| model.remove(id))
	}

	/// Draws the directed link `source -> target`.
	pub fn connect(&self, source: &str, target: &str) -> Result<()> {
		self.session.mutate(|model| model.connect(source, target))
	}

	/// Removes the directed link `source -> target`.
	pub fn disconnect(&self, source: &str, target: &str) -> Result<()> {
		self.session.mutate(|model| model.disconnect(source, target))
	}

	/// Sets the width of `source -> target` from a throughput in bytes per second.
	pub fn rate(&self, source: &str, target: &str, bytes_per_sec: f64) -> Result<()> {
		self.session
			.mutate(|model| model.rate(source, target, bytes_per_sec))
	}

	/// Marks a peer as seeding or not, which recolors it.
	pub fn seed(&self, id: &str, is_seeding: bool) -> Result<()> {
		self.session.mutate(|model| model.seed(id, is_seeding))
	}

	/// Notes that `source` choked `target`. Draws nothing yet.
	pub fn choke(&self, source: &str, target: &str) {
		self.session.with(|m| m.model.choke(source, target));
	}

	/// Notes that `source` unchoked `target`. Draws nothing yet.
	pub fn unchoke(&self, source: &str, target: &str) {
		self.session.with(|m| m.model.unchoke(source, target));
	}

	/// Toggles focus on a peer as if it had been clicked.
	pub fn click(&self, id: &str) -> Result<()> {
		self.session.mutate(|model| model.click(id))
	}

	/// Adds the peers and links of a snapshot, or nothing if any step fails.
	pub fn load(&self, snapshot: GraphSnapshot) -> Result<()> {
		let (peers, links) = (snapshot.peers.len(), snapshot.links.len());
		self.session.mutate(|model| model.load(snapshot))?;
		info!("loaded {} peers, {} links", peers, links);
		Ok(())
	}

	/// True if every id names a peer. False once destroyed.
	pub fn has_peer<S: AsRef<str>>(&self, ids: &[S]) -> bool {
		self.session
			.query(|model| model.has_peer(ids))
			.unwrap_or(false)
	}

	/// True if the directed link `source -> target` exists.
	pub fn has_link(&self, source: &str, target: &str) -> Result<bool> {
		self.session.query(|model| model.has_link(source, target))?
	}

	/// True if the peers are linked in either direction.
	pub fn are_connected(&self, source: &str, target: &str) -> Result<bool> {
		self.session
			.query(|model| model.are_connected(source, target))?
	}

	/// The directed link `source -> target`, if present.
	pub fn get_link(&self, source: &str, target: &str) -> Option<Link> {
		self.session
			.query(|model| model.get_link(source, target).cloned())
			.ok()
			.flatten()
	}

	/// Id of the focused peer, if any.
	pub fn focused(&self) -> Option<String> {
		self.session
			.query(|model| model.focused().map(str::to_string))
			.ok()
			.flatten()
	}

	/// Removes the canvas and every listener. Later calls fail with
	/// [`GraphError::Destroyed`]. Calling it twice is harmless.
	pub fn destroy(&self) {
		let Some(mut m) = self.session.close() else {
			return;
		};
		debug!("destroy");

		if let Some(id) = self.frame.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		self.resize_debounce.cancel();
		let _ = self.window.remove_event_listener_with_callback(
			"resize",
			self.resize_cb.as_ref().unchecked_ref(),
		);
		for (event, cb) in &self.mouse_cbs {
			let _ = m
				.canvas
				.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
		}
		m.canvas.remove();
		m.model.clear();
		info!("peer graph destroyed");
	}
}

impl Drop for PeerGraph {
	fn drop(&mut self) {
		self.destroy();
		// Break the animation closure's reference to itself.
		self.animate.borrow_mut().take();
	}
}

/// Handles one pointer event. Selections it causes are queued on the model.
fn on_pointer(m: &mut Mounted, event: &str, ev: &MouseEvent) {
	let (x, y) = m.pointer(ev);
	match event {
		"mousedown" => {
			m.layout.begin_drag(x, y);
		}
		"mousemove" => {
			if m.layout.drag.node.is_some() {
				m.layout.drag_to(x, y);
			} else {
				let hovered = m.layout.node_at_position(x, y);
				if hovered != m.layout.hover.node {
					let cursor = if hovered.is_some() { "pointer" } else { "default" };
					let _ = m.canvas.style().set_property("cursor", cursor);
					m.layout.set_hover(hovered, &m.model);
				}
			}
		}
		"mouseup" => {
			if let Some((id, false)) = m.layout.end_drag() {
				match m.model.click(&id) {
					Ok(()) => m.update(),
					Err(e) => warn!("{}", e),
				}
			}
		}
		"mouseleave" => {
			m.layout.end_drag();
			m.layout.set_hover(None, &m.model);
		}
		_ => {}
	}
}
