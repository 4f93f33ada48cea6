//! Settings for the network map surface.

use crate::components::topology_map::LayoutParams;

/// Where the snapshot comes from and how the map is laid out.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
	/// Topology snapshot endpoint; a cache-busting parameter is appended.
	pub endpoint: String,
	pub width: f64,
	pub height: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub layout: LayoutParams,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			endpoint: "/data/network.json".into(),
			width: 800.0,
			height: 600.0,
			min_zoom: 0.5,
			max_zoom: 10.0,
			layout: LayoutParams::default(),
		}
	}
}
