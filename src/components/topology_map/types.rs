use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a device plays in the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
	Coordinator,
	Router,
	#[serde(rename = "End Device", alias = "EndDevice")]
	EndDevice,
	Disconnected,
	/// Anything the feed reports that we do not know how to draw.
	#[serde(other)]
	Other,
}

impl DeviceType {
	pub fn as_str(self) -> &'static str {
		match self {
			DeviceType::Coordinator => "Coordinator",
			DeviceType::Router => "Router",
			DeviceType::EndDevice => "End Device",
			DeviceType::Disconnected => "Disconnected",
			DeviceType::Other => "Unknown",
		}
	}
}

impl fmt::Display for DeviceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A telemetry value; the feed mixes numbers and strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
	Number(f64),
	Text(String),
}

impl Metric {
	/// Leading integer of the value: `185.9` gives 185, `"123ms"` gives 123.
	pub fn leading_int(&self) -> Option<i64> {
		match self {
			Metric::Number(n) if n.is_finite() => Some(n.trunc() as i64),
			Metric::Number(_) => None,
			Metric::Text(s) => {
				let s = s.trim_start();
				let (sign, digits) = match s.as_bytes().first() {
					Some(b'-') => (-1, &s[1..]),
					Some(b'+') => (1, &s[1..]),
					_ => (1, s),
				};
				let end = digits
					.find(|c: char| !c.is_ascii_digit())
					.unwrap_or(digits.len());
				let digits = &digits[..end];
				if digits.is_empty() {
					return None;
				}
				// Runs too long for i64 saturate rather than vanish.
				Some(match digits.parse::<i64>() {
					Ok(v) => sign * v,
					Err(_) if sign < 0 => i64::MIN,
					Err(_) => i64::MAX,
				})
			}
		}
	}
}

impl fmt::Display for Metric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Metric::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
			Metric::Number(n) => write!(f, "{n}"),
			Metric::Text(s) => f.write_str(s),
		}
	}
}

/// One device as it appears in the topology feed.
///
/// Required fields are optional here so a missing one is reported by the
/// graph builder with its position instead of failing the whole decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
	#[serde(default, rename = "ieee_address", alias = "ieeeAddress")]
	pub ieee_address: Option<String>,
	#[serde(default, rename = "shortAddress")]
	pub short_address: Option<String>,
	#[serde(default, rename = "deviceType")]
	pub device_type: Option<DeviceType>,
	#[serde(default, rename = "workingMemory", alias = "workingMemoryHex")]
	pub working_memory_hex: Option<String>,
	#[serde(default, rename = "deviceUptime", alias = "deviceUptimeHex")]
	pub device_uptime_hex: Option<String>,
	#[serde(default, rename = "packetLoss")]
	pub packet_loss: Option<Metric>,
	#[serde(default, rename = "txFailure", alias = "txFailures")]
	pub tx_failures: Option<Metric>,
	#[serde(default, rename = "hopcount", alias = "hopCount")]
	pub hop_count: Option<Metric>,
	#[serde(default, rename = "laptime", alias = "lapTimeMs")]
	pub lap_time_ms: Option<Metric>,
	#[serde(default, rename = "chan", alias = "channel")]
	pub channel: Option<Metric>,
	#[serde(default)]
	pub sku: Option<Metric>,
	#[serde(default, rename = "fwvers", alias = "firmwareVersion")]
	pub firmware_version: Option<Metric>,
}

/// One child to parent radio relationship from the feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
	#[serde(default, rename = "ieee_address", alias = "childAddress")]
	pub child_address: Option<String>,
	#[serde(default, rename = "parent_ieee_address", alias = "parentAddress")]
	pub parent_address: Option<String>,
	#[serde(default)]
	pub rssi: Option<f64>,
}

/// A full network snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecord {
	pub nodes: Vec<DeviceRecord>,
	pub links: Vec<LinkRecord>,
}

/// A validated device, owned by the layout graph.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceNode {
	pub ieee_address: String,
	pub device_type: DeviceType,
	pub record: DeviceRecord,
}

impl DeviceNode {
	pub fn lap_time_ms(&self) -> Option<i64> {
		self.record.lap_time_ms.as_ref().and_then(Metric::leading_int)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn decodes_feed_field_names() {
		let raw = json!({
			"nodes": [{
				"ieee_address": "00:12:4b:00:01",
				"shortAddress": "0x0000",
				"deviceType": "End Device",
				"workingMemory": "0bb8",
				"laptime": 120,
				"chan": 15,
				"fwvers": "1.2.3"
			}],
			"links": [{ "ieee_address": "a", "parent_ieee_address": "b", "rssi": -40 }]
		});
		let topo: TopologyRecord = serde_json::from_value(raw).unwrap();
		let node = &topo.nodes[0];
		assert_eq!(node.device_type, Some(DeviceType::EndDevice));
		assert_eq!(node.working_memory_hex.as_deref(), Some("0bb8"));
		assert_eq!(node.lap_time_ms, Some(Metric::Number(120.0)));
		assert_eq!(node.firmware_version, Some(Metric::Text("1.2.3".into())));
		assert_eq!(topo.links[0].child_address.as_deref(), Some("a"));
		assert_eq!(topo.links[0].parent_address.as_deref(), Some("b"));
		assert_eq!(topo.links[0].rssi, Some(-40.0));
	}

	#[test]
	fn accepts_camel_case_aliases() {
		let raw = json!({
			"nodes": [{ "ieeeAddress": "A", "deviceType": "EndDevice", "lapTimeMs": "90" }],
			"links": [{ "childAddress": "A", "parentAddress": "B", "rssi": -71.5 }]
		});
		let topo: TopologyRecord = serde_json::from_value(raw).unwrap();
		assert_eq!(topo.nodes[0].ieee_address.as_deref(), Some("A"));
		assert_eq!(topo.nodes[0].device_type, Some(DeviceType::EndDevice));
		assert_eq!(topo.links[0].parent_address.as_deref(), Some("B"));
	}

	#[test]
	fn unknown_device_type_is_other() {
		let raw = json!({ "ieee_address": "X", "deviceType": "Repeater" });
		let rec: DeviceRecord = serde_json::from_value(raw).unwrap();
		assert_eq!(rec.device_type, Some(DeviceType::Other));
	}

	#[test]
	fn leading_int_follows_integer_prefix() {
		assert_eq!(Metric::Number(185.9).leading_int(), Some(185));
		assert_eq!(Metric::Text("123ms".into()).leading_int(), Some(123));
		assert_eq!(Metric::Text("  -7".into()).leading_int(), Some(-7));
		assert_eq!(Metric::Text("n/a".into()).leading_int(), None);
		assert_eq!(Metric::Text(String::new()).leading_int(), None);
		assert_eq!(Metric::Number(f64::NAN).leading_int(), None);
		assert_eq!(Metric::Text("99999999999999999999".into()).leading_int(), Some(i64::MAX));
		assert_eq!(Metric::Text("-99999999999999999999ms".into()).leading_int(), Some(i64::MIN));
	}

	#[test]
	fn metric_display_drops_integral_fraction() {
		assert_eq!(Metric::Number(15.0).to_string(), "15");
		assert_eq!(Metric::Number(0.25).to_string(), "0.25");
		assert_eq!(Metric::Text("abc".into()).to_string(), "abc");
	}
}
