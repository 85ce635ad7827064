//! Peer-to-peer swarm visualization widget.
//!
//! Renders peers as nodes and their connections as rated, directed links on an
//! HTML canvas, laid out by a force simulation:
//! - Imperative mutation API (add/remove, connect/disconnect, rate, seed)
//! - Stroke width tracks link throughput
//! - Hover highlights a peer's children and parents
//! - Clicking a peer focuses its neighbourhood and emits a [`Selection`]
//!
//! # Example
//!
//! ```ignore
//! use peer_graph::{PeerGraph, PeerNode};
//!
//! let graph = PeerGraph::from_selector(".torrent-graph")?;
//! graph.on_select(|selection| log::info!("selected {:?}", selection.id()));
//! graph.add(PeerNode::local("You", "You"))?;
//! graph.add(PeerNode::new("Thing1", "192.168.1.20"))?;
//! graph.connect("You", "Thing1")?;
//! graph.rate("You", "Thing1", 500_000.0)?;
//! ```

mod debounce;
pub mod error;
pub mod model;
mod render;
pub mod scale;
mod session;
mod state;
pub mod style;
mod types;
mod widget;

pub use error::{Endpoint, GraphError};
pub use model::GraphModel;
pub use style::{Color, GraphStyle};
pub use types::{GraphSnapshot, Link, PeerNode, Selection, SnapshotLink};
pub use widget::PeerGraph;
