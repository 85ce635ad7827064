//! peer-graph: live force-directed visualization of a peer-to-peer swarm.
//!
//! This crate provides a WASM widget that draws peers and their connections on a
//! canvas, driven by an imperative API (add/remove peers, connect, rate, seed),
//! plus a demo app that replays a scripted swarm session.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, error, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod demo;

pub use components::peer_graph::{
	GraphError, GraphModel, GraphSnapshot, GraphStyle, Link, PeerGraph, PeerNode, Selection,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("peer-graph: logging initialized");
}

/// Parse JSON embedded in a script element with the given id.
fn load_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => {
			info!("peer-graph: loaded #{}", id);
			Some(value)
		}
		Err(e) => {
			warn!("peer-graph: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Main application component.
/// Mounts a peer graph, then either loads `#peer-graph-data` or plays the demo script.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let style = load_json::<GraphStyle>("peer-graph-style").unwrap_or_default();
	let snapshot = load_json::<GraphSnapshot>("peer-graph-data");
	let selected = RwSignal::new(None::<String>);

	let container_ref = NodeRef::<leptos::html::Div>::new();
	let graph: Rc<RefCell<Option<Rc<PeerGraph>>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		if graph.borrow().is_some() {
			return;
		}
		let peer_graph = match PeerGraph::with_style(container.as_ref(), style.clone()) {
			Ok(g) => Rc::new(g),
			Err(e) => {
				error!("peer-graph: {}", e);
				return;
			}
		};
		peer_graph.on_select(move |selection| {
			info!("peer-graph: select {:?}", selection.id());
			selected.set(selection.id().map(str::to_string));
		});

		match snapshot.clone() {
			Some(data) => {
				if let Err(e) = peer_graph.load(data) {
					warn!("peer-graph: {}", e);
				}
			}
			None => demo::run(peer_graph.clone()),
		}
		*graph.borrow_mut() = Some(peer_graph);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Peer Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="peer-graph-page">
			<h1>"Swarm"</h1>
			<p class="subtitle">
				{move || match selected.get() {
					Some(id) => format!("Selected: {id}"),
					None => "Click a peer to focus its connections.".to_string(),
				}}
			</p>
			<div class="torrent-graph" node_ref=container_ref></div>
		</div>
	}
}
