//! Device attribute to visual parameter mappings.

use super::types::DeviceType;

/// Body radius for device types the encoder does not know.
pub const FALLBACK_RADIUS: f64 = 16.0;

/// Health bucket derived from a device's lap time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HealthColor {
	Healthy,
	Warning,
	Critical,
	Unknown,
}

impl HealthColor {
	pub fn css(self) -> &'static str {
		match self {
			HealthColor::Healthy => "#4EA500",
			HealthColor::Warning => "#FDD805",
			HealthColor::Critical => "#ED1C24",
			HealthColor::Unknown => "#A0A0A0",
		}
	}
}

/// Color bucket for a lap time in milliseconds.
///
/// Exactly 371 falls through every branch and is `Unknown`; this matches the
/// deployed map, which renders such devices grey.
pub fn health_color(lap_time_ms: Option<i64>) -> HealthColor {
	match lap_time_ms {
		Some(t) if t < 186 => HealthColor::Healthy,
		Some(t) if t < 371 => HealthColor::Warning,
		Some(t) if t > 371 => HealthColor::Critical,
		_ => HealthColor::Unknown,
	}
}

pub fn node_radius(device_type: DeviceType) -> Option<f64> {
	match device_type {
		DeviceType::Coordinator => Some(22.0),
		DeviceType::Router => Some(19.0),
		DeviceType::EndDevice => Some(16.0),
		DeviceType::Disconnected => Some(19.0),
		DeviceType::Other => None,
	}
}

pub fn glyph(device_type: DeviceType) -> Option<char> {
	match device_type {
		DeviceType::Coordinator => Some('C'),
		DeviceType::Router => Some('R'),
		DeviceType::EndDevice => Some('E'),
		DeviceType::Disconnected => Some('D'),
		DeviceType::Other => None,
	}
}
