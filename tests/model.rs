//! Behaviour of the swarm model through the public API.

#![allow(unused_crate_dependencies)]

use peer_graph::{GraphError, GraphModel, GraphStyle, PeerNode, Selection};

fn peer(id: &str) -> PeerNode {
	PeerNode::new(id, id)
}

fn scenario() -> GraphModel {
	let mut model = GraphModel::new(GraphStyle::default().link);
	model.add(PeerNode::local("You", "You")).unwrap();
	model.add(PeerNode::new("Thing1", "192.168.1.20")).unwrap();
	model.add(PeerNode::new("Thing2", "192.168.1.44")).unwrap();
	model
}

#[test]
fn list_counts_successful_adds() {
	let mut model = GraphModel::default();
	for i in 0..25 {
		model.add(peer(&format!("peer-{i}"))).unwrap();
		assert_eq!(model.list().len(), i + 1);
	}
	assert!(model.add(peer("peer-7")).is_err());
	assert_eq!(model.list().len(), 25);
	assert_eq!(model.list()[0].id, "peer-0");
	assert_eq!(model.list()[24].id, "peer-24");
}

#[test]
fn connect_is_directed_but_connectivity_is_not() {
	let mut model = scenario();
	model.connect("You", "Thing1").unwrap();
	assert!(model.has_link("You", "Thing1").unwrap());
	assert!(!model.has_link("Thing1", "You").unwrap());
	assert!(model.are_connected("You", "Thing1").unwrap());
	assert!(model.are_connected("Thing1", "You").unwrap());
	assert!(!model.are_connected("Thing1", "Thing2").unwrap());
}

#[test]
fn queries_reject_unknown_ids() {
	let model = scenario();
	assert_eq!(
		model.has_link("You", "Ghost").unwrap_err().to_string(),
		"hasLink: invalid target id"
	);
	assert_eq!(
		model.are_connected("Ghost", "You").unwrap_err().to_string(),
		"areConnected: invalid source id"
	);
}

#[test]
fn disconnect_restores_state() {
	let mut model = scenario();
	model.connect("You", "Thing1").unwrap();
	model.disconnect("You", "Thing1").unwrap();
	assert!(!model.has_link("You", "Thing1").unwrap());

	model.connect("You", "Thing2").unwrap();
	let err = model.disconnect("You", "Thing1").unwrap_err();
	assert_eq!(err, GraphError::MissingLink { op: "disconnect" });
	assert_eq!(model.links().len(), 1);
}

#[test]
fn rate_saturates_and_rejects_negatives() {
	let mut model = scenario();
	model.connect("You", "Thing1").unwrap();
	model.connect("Thing2", "Thing1").unwrap();

	model.rate("You", "Thing1", 2_097_152.0).unwrap();
	let at_threshold = model.get_link("You", "Thing1").unwrap().width;
	model.rate("You", "Thing1", 9_999_999.0).unwrap();
	assert_eq!(model.get_link("You", "Thing1").unwrap().width, at_threshold);

	for (a, b) in [("You", "Thing1"), ("Thing2", "Thing1")] {
		assert!(matches!(
			model.rate(a, b, -1.0),
			Err(GraphError::InvalidRate(_))
		));
	}
	assert_eq!(model.get_link("You", "Thing1").unwrap().width, at_threshold);
}

#[test]
fn removing_focused_peer_emits_one_deselect() {
	let mut model = scenario();
	model.click("Thing1").unwrap();
	assert_eq!(
		model.take_events(),
		vec![Selection::Selected("Thing1".into())]
	);

	model.remove("Thing2").unwrap();
	assert!(model.take_events().is_empty());
	assert_eq!(model.focused(), Some("Thing1"));

	model.remove("Thing1").unwrap();
	assert_eq!(model.take_events(), vec![Selection::Cleared]);
	assert_eq!(model.focused(), None);
}

#[test]
fn failed_calls_leave_model_unchanged() {
	let mut model = scenario();
	model.connect("You", "Thing1").unwrap();
	let (nodes, links) = (model.list().to_vec(), model.links().to_vec());

	assert!(model.add(PeerNode::local("You", "again")).is_err());
	assert!(model.remove("Ghost").is_err());
	assert!(model.connect("You", "Thing1").is_err());
	assert!(model.connect("Ghost", "Thing1").is_err());
	assert!(model.disconnect("Thing1", "You").is_err());
	assert!(model.rate("You", "Thing2", 10.0).is_err());
	assert!(model.seed("Ghost", true).is_err());

	assert_eq!(model.list(), nodes.as_slice());
	assert_eq!(model.links(), links.as_slice());
}

#[test]
fn has_peer_requires_all_ids() {
	let model = scenario();
	assert!(model.has_peer(&["You", "Thing1", "Thing2"]));
	assert!(!model.has_peer(&["You", "Ghost"]));
	assert!(model.has_peer::<&str>(&[]));
}

#[test]
fn choke_and_unchoke_are_no_ops() {
	let mut model = scenario();
	model.connect("You", "Thing1").unwrap();
	let links = model.links().to_vec();
	model.choke("You", "Thing1");
	model.unchoke("You", "Thing1");
	model.choke("Ghost", "Nobody");
	assert_eq!(model.links(), links.as_slice());
}

#[test]
fn torrent_session() {
	let style = GraphStyle::default();
	let mut model = scenario();

	model.connect("You", "Thing1").unwrap();

	model.rate("You", "Thing1", 150_000.0).unwrap();
	let width = model.get_link("You", "Thing1").unwrap().width.unwrap();
	assert!(width > style.link.min_width && width < style.link.max_width);

	model.rate("You", "Thing1", 5_000_000.0).unwrap();
	assert_eq!(
		model.get_link("You", "Thing1").unwrap().width,
		Some(style.link.max_width)
	);

	model.disconnect("You", "Thing1").unwrap();
	assert!(!model.has_link("You", "Thing1").unwrap());

	model.remove("Thing1").unwrap();
	assert!(!model.has_peer(&["Thing1"]));
	assert_eq!(model.list().len(), 2);
}
