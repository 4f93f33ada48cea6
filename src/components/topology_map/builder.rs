use std::collections::HashMap;

use log::warn;

use super::types::{DeviceNode, DeviceType, LinkRecord, TopologyRecord};
use crate::error::TopologyError;

/// Position of a node in [`LayoutGraph::nodes`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Synthetic particle that curves and labels one link.
#[derive(Clone, Debug, PartialEq)]
pub struct MidpointNode {
	pub link_index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphNode {
	Device(DeviceNode),
	Midpoint(MidpointNode),
}

impl GraphNode {
	pub fn as_device(&self) -> Option<&DeviceNode> {
		match self {
			GraphNode::Device(d) => Some(d),
			GraphNode::Midpoint(_) => None,
		}
	}
}

/// A spring between two simulation particles. `None` is an endpoint that
/// named an address missing from the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimLink {
	pub source: Option<NodeId>,
	pub target: Option<NodeId>,
}

/// One visible edge: child, its link midpoint, and the parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Bilink {
	pub child: Option<NodeId>,
	pub midpoint: NodeId,
	pub parent: Option<NodeId>,
	pub rssi: f64,
}

impl Bilink {
	pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
		Some((self.child?, self.parent?))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	Child,
	Parent,
}

/// A link endpoint that did not resolve; the edge is kept but not drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedEndpoint {
	pub link_index: usize,
	pub endpoint: Endpoint,
	pub address: String,
}

/// Layout-ready graph, rebuilt from scratch for every snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutGraph {
	pub nodes: Vec<GraphNode>,
	pub sim_links: Vec<SimLink>,
	pub bilinks: Vec<Bilink>,
	pub unresolved: Vec<UnresolvedEndpoint>,
}

impl LayoutGraph {
	pub fn device(&self, id: NodeId) -> Option<&DeviceNode> {
		self.nodes.get(id.0).and_then(GraphNode::as_device)
	}

	pub fn devices(&self) -> impl Iterator<Item = (NodeId, &DeviceNode)> + '_ {
		self.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, n)| n.as_device().map(|d| (NodeId(i), d)))
	}

	/// The node to select once the surface is ready: the coordinator, but
	/// only when the snapshot has exactly one.
	pub fn default_selection(&self) -> Option<NodeId> {
		let mut coordinators = self
			.devices()
			.filter(|(_, d)| d.device_type == DeviceType::Coordinator)
			.map(|(id, _)| id);
		match (coordinators.next(), coordinators.next()) {
			(Some(id), None) => Some(id),
			_ => None,
		}
	}
}

/// Turn a snapshot into a layout graph. Nothing is built if any record is
/// missing a required field.
pub fn build(topology: &TopologyRecord) -> Result<LayoutGraph, TopologyError> {
	let mut nodes = Vec::with_capacity(topology.nodes.len() + topology.links.len());
	let mut by_address: HashMap<&str, NodeId> = HashMap::new();

	for (index, record) in topology.nodes.iter().enumerate() {
		let ieee_address = record
			.ieee_address
			.as_deref()
			.filter(|a| !a.is_empty())
			.ok_or(TopologyError::MissingField {
				entity: "node",
				index,
				field: "ieee_address",
			})?;
		let device_type = record.device_type.ok_or(TopologyError::MissingField {
			entity: "node",
			index,
			field: "deviceType",
		})?;

		let id = NodeId(nodes.len());
		if by_address.contains_key(ieee_address) {
			warn!("duplicate device address {ieee_address}; links resolve to the first entry");
		} else {
			by_address.insert(ieee_address, id);
		}
		nodes.push(GraphNode::Device(DeviceNode {
			ieee_address: ieee_address.to_string(),
			device_type,
			record: record.clone(),
		}));
	}

	let mut checked = Vec::with_capacity(topology.links.len());
	for (index, link) in topology.links.iter().enumerate() {
		checked.push(validate_link(index, link)?);
	}

	let mut sim_links = Vec::with_capacity(checked.len() * 2);
	let mut bilinks = Vec::with_capacity(checked.len());
	let mut unresolved = Vec::new();

	for (link_index, (child_address, parent_address, rssi)) in checked.into_iter().enumerate() {
		let mut resolve = |address: &str, endpoint| {
			let found = by_address.get(address).copied();
			if found.is_none() {
				warn!("link #{link_index} references unknown device {address}");
				unresolved.push(UnresolvedEndpoint {
					link_index,
					endpoint,
					address: address.to_string(),
				});
			}
			found
		};
		let child = resolve(child_address, Endpoint::Child);
		let parent = resolve(parent_address, Endpoint::Parent);

		let midpoint = NodeId(nodes.len());
		nodes.push(GraphNode::Midpoint(MidpointNode { link_index }));

		sim_links.push(SimLink {
			source: child,
			target: Some(midpoint),
		});
		sim_links.push(SimLink {
			source: Some(midpoint),
			target: parent,
		});
		bilinks.push(Bilink {
			child,
			midpoint,
			parent,
			rssi,
		});
	}

	Ok(LayoutGraph {
		nodes,
		sim_links,
		bilinks,
		unresolved,
	})
}

fn validate_link(index: usize, link: &LinkRecord) -> Result<(&str, &str, f64), TopologyError> {
	let missing = |field| TopologyError::MissingField {
		entity: "link",
		index,
		field,
	};
	let child = link
		.child_address
		.as_deref()
		.filter(|a| !a.is_empty())
		.ok_or_else(|| missing("ieee_address"))?;
	let parent = link
		.parent_address
		.as_deref()
		.filter(|a| !a.is_empty())
		.ok_or_else(|| missing("parent_ieee_address"))?;
	let rssi = link.rssi.ok_or_else(|| missing("rssi"))?;
	if child == parent {
		return Err(TopologyError::SelfLink {
			index,
			address: child.to_string(),
		});
	}
	Ok((child, parent, rssi))
}
