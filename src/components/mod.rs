//! UI components.

pub mod peer_graph;
