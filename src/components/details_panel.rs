use leptos::prelude::*;

use super::topology_map::{DeviceType, Metric, SelectionEvent};

/// Working memory reported as 100% used.
const MEMORY_CAPACITY: f64 = 3000.0;
const PLACEHOLDER: &str = "-";

/// Display strings for the side panel.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceDetails {
	pub device_type: String,
	pub address: String,
	pub short_address: String,
	pub memory: String,
	pub memory_percent: String,
	pub uptime: String,
	pub packet_loss: String,
	pub retries: String,
	pub hop_count: String,
	pub lap_time: String,
	pub channel: String,
	pub sku: String,
	pub firmware: String,
}

impl DeviceDetails {
	pub fn from_event(event: &SelectionEvent) -> Self {
		let connected = event.device_type != DeviceType::Disconnected;
		let text = |value: Option<String>| {
			value
				.filter(|_| connected)
				.unwrap_or_else(|| PLACEHOLDER.to_string())
		};
		let metric = |value: &Option<Metric>| text(value.as_ref().map(Metric::to_string));
		let memory = event.working_memory_hex.as_deref().and_then(decode_hex);

		Self {
			device_type: event.device_type.to_string(),
			address: text(event.ieee_address.clone()),
			short_address: text(event.short_address.clone()),
			memory: text(memory.map(|m| m.to_string())),
			memory_percent: text(memory.map(|m| format!("{:.1}%", m as f64 / MEMORY_CAPACITY * 100.0))),
			uptime: text(
				event
					.device_uptime_hex
					.as_deref()
					.and_then(decode_hex)
					.map(|s| format!("{s} s")),
			),
			packet_loss: metric(&event.packet_loss),
			retries: metric(&event.tx_failures),
			hop_count: metric(&event.hop_count),
			lap_time: metric(&event.lap_time_ms),
			channel: metric(&event.channel),
			sku: metric(&event.sku),
			firmware: metric(&event.firmware_version),
		}
	}
}

/// Leading hex digits of a base-16 field, with or without `0x`.
pub fn decode_hex(raw: &str) -> Option<u64> {
	let raw = raw.trim();
	let raw = raw
		.strip_prefix("0x")
		.or_else(|| raw.strip_prefix("0X"))
		.unwrap_or(raw);
	let end = raw
		.find(|c: char| !c.is_ascii_hexdigit())
		.unwrap_or(raw.len());
	u64::from_str_radix(&raw[..end], 16).ok()
}

/// Side panel showing the most recently clicked device.
#[component]
pub fn DetailsPanel(#[prop(into)] selected: Signal<Option<SelectionEvent>>) -> impl IntoView {
	let details = Memo::new(move |_| selected.get().as_ref().map(DeviceDetails::from_event));

	view! {
		<aside class="network-details">
			<h2>"Device details"</h2>
			{move || match details.get() {
				None => view! { <p class="hint">"Click a device to inspect it."</p> }.into_any(),
				Some(d) => {
					let rows = [
						("Type", d.device_type),
						("IEEE address", d.address),
						("Short address", d.short_address),
						("Working memory", d.memory),
						("Memory used", d.memory_percent),
						("Uptime", d.uptime),
						("Packet loss", d.packet_loss),
						("Retries", d.retries),
						("Hop count", d.hop_count),
						("Lap time (ms)", d.lap_time),
						("Channel", d.channel),
						("SKU", d.sku),
						("Firmware", d.firmware),
					];
					view! {
						<dl>
							{rows
								.into_iter()
								.map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
								.collect_view()}
						</dl>
					}
					.into_any()
				}
			}}
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn router() -> SelectionEvent {
		SelectionEvent {
			device_type: DeviceType::Router,
			ieee_address: Some("00:12:4b".into()),
			short_address: Some("0x1a2b".into()),
			working_memory_hex: Some("0bb8".into()),
			device_uptime_hex: Some("0x3c".into()),
			packet_loss: Some(Metric::Number(2.0)),
			tx_failures: Some(Metric::Number(0.0)),
			hop_count: Some(Metric::Text("2".into())),
			lap_time_ms: Some(Metric::Number(120.0)),
			channel: Some(Metric::Number(15.0)),
			sku: None,
			firmware_version: Some(Metric::Text("1.4".into())),
		}
	}

	#[test]
	fn decodes_hex_fields() {
		let d = DeviceDetails::from_event(&router());
		assert_eq!(d.device_type, "Router");
		assert_eq!(d.memory, "3000");
		assert_eq!(d.memory_percent, "100.0%");
		assert_eq!(d.uptime, "60 s");
		assert_eq!(d.hop_count, "2");
		assert_eq!(d.lap_time, "120");
		assert_eq!(d.sku, "-");
	}

	#[test]
	fn disconnected_renders_placeholders() {
		let event = SelectionEvent {
			device_type: DeviceType::Disconnected,
			..router()
		};
		let d = DeviceDetails::from_event(&event);
		assert_eq!(d.device_type, "Disconnected");
		for field in [&d.address, &d.memory, &d.uptime, &d.channel, &d.firmware] {
			assert_eq!(field, "-");
		}
	}

	#[test]
	fn decode_hex_reads_leading_digits() {
		assert_eq!(decode_hex("ff"), Some(255));
		assert_eq!(decode_hex("0X10"), Some(16));
		assert_eq!(decode_hex(" 1fzz"), Some(31));
		assert_eq!(decode_hex("zz"), None);
		assert_eq!(decode_hex(""), None);
	}
}
