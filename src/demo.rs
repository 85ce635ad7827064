//! Scripted swarm session that exercises every widget operation in turn.

use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;

use crate::components::peer_graph::{GraphError, PeerGraph, PeerNode};

/// One scripted call against the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
	Connect(&'static str, &'static str),
	Rate(&'static str, &'static str, f64),
	Choke(&'static str, &'static str),
	Unchoke(&'static str, &'static str),
	Disconnect(&'static str, &'static str),
	Remove(&'static str),
	Seed(&'static str, bool),
}

impl Step {
	fn apply(&self, graph: &PeerGraph) -> Result<(), GraphError> {
		match *self {
			Step::Connect(a, b) => graph.connect(a, b),
			Step::Rate(a, b, rate) => graph.rate(a, b, rate),
			Step::Choke(a, b) => {
				graph.choke(a, b);
				Ok(())
			}
			Step::Unchoke(a, b) => {
				graph.unchoke(a, b);
				Ok(())
			}
			Step::Disconnect(a, b) => graph.disconnect(a, b),
			Step::Remove(id) => graph.remove(id),
			Step::Seed(id, seeding) => graph.seed(id, seeding),
		}
	}
}

/// Peers present before the script starts.
pub fn demo_peers() -> Vec<PeerNode> {
	vec![
		PeerNode::local("You", "You"),
		PeerNode::new("Thing1", "192.168.1.20"),
		PeerNode::new("Thing2", "192.168.1.44"),
	]
}

/// `(delay in ms, step)` pairs, each delay counted from the previous step.
pub fn demo_script() -> Vec<(i32, Step)> {
	vec![
		(2000, Step::Connect("You", "Thing1")),
		(1000, Step::Rate("You", "Thing1", 150_000.0)),
		(1000, Step::Rate("You", "Thing1", 500_000.0)),
		(1000, Step::Rate("You", "Thing1", 2_500_000.0)),
		(1000, Step::Rate("You", "Thing1", 5_000_000.0)),
		(1000, Step::Rate("You", "Thing1", 2_500_000.0)),
		(1000, Step::Rate("You", "Thing1", 1_000_000.0)),
		(2000, Step::Choke("You", "Thing1")),
		(2000, Step::Unchoke("You", "Thing1")),
		(2000, Step::Disconnect("You", "Thing1")),
		(2000, Step::Remove("Thing1")),
		(2000, Step::Seed("Thing2", true)),
		(2000, Step::Seed("Thing2", false)),
	]
}

/// Adds the demo peers and plays the script against `graph`.
pub fn run(graph: Rc<PeerGraph>) {
	for peer in demo_peers() {
		if let Err(e) = graph.add(peer) {
			warn!("demo: {}", e);
		}
	}
	schedule(graph, Rc::from(demo_script()), 0);
}

fn schedule(graph: Rc<PeerGraph>, script: Rc<[(i32, Step)]>, i: usize) {
	let Some((delay, _)) = script.get(i) else {
		info!("demo: finished");
		return;
	};
	let delay = *delay;
	let Some(window) = web_sys::window() else {
		return;
	};
	let cb = Closure::once_into_js(move || {
		let step = &script[i].1;
		info!("demo: {:?}", step);
		if let Err(e) = step.apply(&graph) {
			warn!("demo: {}", e);
		}
		schedule(graph, script, i + 1);
	});
	if let Err(e) =
		window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay)
	{
		warn!("demo: could not schedule step: {:?}", e);
	}
}
