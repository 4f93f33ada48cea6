use serde::Serialize;

use super::builder::{LayoutGraph, NodeId};
use super::types::{DeviceNode, DeviceType, Metric};

/// At most one highlighted device per rendered graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	Unselected,
	Selected(NodeId),
}

impl Selection {
	pub fn selected(self) -> Option<NodeId> {
		match self {
			Selection::Unselected => None,
			Selection::Selected(id) => Some(id),
		}
	}

	/// Move to `Selected(id)` and return the event to broadcast. Clicking the
	/// current node again broadcasts again. Non-device ids leave the state
	/// untouched.
	pub fn select(&mut self, graph: &LayoutGraph, id: NodeId) -> Option<SelectionEvent> {
		let device = graph.device(id)?;
		*self = Selection::Selected(id);
		Some(SelectionEvent::from_device(device))
	}
}

/// Payload handed to the details panel when a device is clicked.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEvent {
	pub device_type: DeviceType,
	pub ieee_address: Option<String>,
	pub short_address: Option<String>,
	pub working_memory_hex: Option<String>,
	pub device_uptime_hex: Option<String>,
	pub packet_loss: Option<Metric>,
	pub tx_failures: Option<Metric>,
	pub hop_count: Option<Metric>,
	pub lap_time_ms: Option<Metric>,
	pub channel: Option<Metric>,
	pub sku: Option<Metric>,
	pub firmware_version: Option<Metric>,
}

impl SelectionEvent {
	/// A disconnected device only reports its type; every other field is
	/// left empty.
	pub fn disconnected() -> Self {
		Self {
			device_type: DeviceType::Disconnected,
			ieee_address: None,
			short_address: None,
			working_memory_hex: None,
			device_uptime_hex: None,
			packet_loss: None,
			tx_failures: None,
			hop_count: None,
			lap_time_ms: None,
			channel: None,
			sku: None,
			firmware_version: None,
		}
	}

	pub fn from_device(device: &DeviceNode) -> Self {
		if device.device_type == DeviceType::Disconnected {
			return Self::disconnected();
		}
		let r = &device.record;
		Self {
			device_type: device.device_type,
			ieee_address: Some(device.ieee_address.clone()),
			short_address: r.short_address.clone(),
			working_memory_hex: r.working_memory_hex.clone(),
			device_uptime_hex: r.device_uptime_hex.clone(),
			packet_loss: r.packet_loss.clone(),
			tx_failures: r.tx_failures.clone(),
			hop_count: r.hop_count.clone(),
			lap_time_ms: r.lap_time_ms.clone(),
			channel: r.channel.clone(),
			sku: r.sku.clone(),
			firmware_version: r.firmware_version.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_map::builder::build;
	use crate::components::topology_map::types::TopologyRecord;
	use serde_json::json;

	fn graph() -> LayoutGraph {
		let topo: TopologyRecord = serde_json::from_value(json!({
			"nodes": [
				{ "ieee_address": "A", "deviceType": "Coordinator", "shortAddress": "0x0000" },
				{ "ieee_address": "B", "deviceType": "Router", "laptime": 100, "hopcount": 1 },
				{ "ieee_address": "D", "deviceType": "Disconnected", "laptime": 900, "sku": "X1" }
			],
			"links": [{ "ieee_address": "B", "parent_ieee_address": "A", "rssi": -40 }]
		}))
		.unwrap();
		build(&topo).unwrap()
	}

	#[test]
	fn starts_unselected() {
		assert_eq!(Selection::default(), Selection::Unselected);
		assert_eq!(Selection::default().selected(), None);
	}

	#[test]
	fn clicking_coordinator_broadcasts_its_type() {
		let graph = graph();
		let mut selection = Selection::default();
		let event = selection.select(&graph, NodeId(0)).unwrap();
		assert_eq!(event.device_type, DeviceType::Coordinator);
		assert_eq!(event.ieee_address.as_deref(), Some("A"));
		assert_eq!(event.short_address.as_deref(), Some("0x0000"));
		assert_eq!(selection, Selection::Selected(NodeId(0)));
	}

	#[test]
	fn second_click_replaces_first() {
		let graph = graph();
		let mut selection = Selection::default();
		selection.select(&graph, NodeId(0));
		let first = selection.select(&graph, NodeId(1)).unwrap();
		assert_eq!(selection.selected(), Some(NodeId(1)));

		let again = selection.select(&graph, NodeId(1)).unwrap();
		assert_eq!(first, again);
		assert_eq!(again.hop_count, Some(Metric::Number(1.0)));
		assert_eq!(selection.selected(), Some(NodeId(1)));
	}

	#[test]
	fn disconnected_device_hides_telemetry() {
		let graph = graph();
		let mut selection = Selection::default();
		let event = selection.select(&graph, NodeId(2)).unwrap();
		assert_eq!(event, SelectionEvent::disconnected());
		assert_eq!(event.lap_time_ms, None);
		assert_eq!(event.sku, None);
	}

	#[test]
	fn midpoint_click_keeps_previous_selection() {
		let graph = graph();
		let mut selection = Selection::default();
		selection.select(&graph, NodeId(0));
		let midpoint = graph.bilinks[0].midpoint;
		assert_eq!(selection.select(&graph, midpoint), None);
		assert_eq!(selection.selected(), Some(NodeId(0)));
	}

	#[test]
	fn event_serializes_with_camel_case_keys() {
		let graph = graph();
		let event = SelectionEvent::from_device(graph.device(NodeId(1)).unwrap());
		let value = serde_json::to_value(&event).unwrap();
		assert_eq!(value["deviceType"], json!("Router"));
		assert_eq!(value["ieeeAddress"], json!("B"));
		assert_eq!(value["lapTimeMs"], json!(100.0));
	}
}
