//! Topology snapshot retrieval.

use std::cell::Cell;

use gloo_net::http::Request;
use log::info;

use crate::components::topology_map::TopologyRecord;
use crate::error::FetchError;

thread_local! {
	static LAST_STAMP: Cell<u64> = const { Cell::new(0) };
}

/// A stamp that differs from every earlier one, even within a millisecond.
fn next_stamp(now_ms: u64) -> u64 {
	LAST_STAMP.with(|last| {
		let stamp = now_ms.max(last.get() + 1);
		last.set(stamp);
		stamp
	})
}

pub fn cache_busted_url(endpoint: &str, stamp: u64) -> String {
	let sep = if endpoint.contains('?') { '&' } else { '?' };
	format!("{endpoint}{sep}nocache={stamp}")
}

/// Fetch the current snapshot. Each call bypasses any HTTP cache.
pub async fn fetch_topology(endpoint: &str) -> Result<TopologyRecord, FetchError> {
	let url = cache_busted_url(endpoint, next_stamp(js_sys::Date::now() as u64));
	let transport = |source| FetchError::Transport {
		url: url.clone(),
		source,
	};

	let response = Request::get(&url).send().await.map_err(transport)?;
	if !response.ok() {
		return Err(FetchError::Status {
			url: url.clone(),
			status: response.status(),
		});
	}
	let body = response.text().await.map_err(transport)?;
	let topology: TopologyRecord =
		serde_json::from_str(&body).map_err(|source| FetchError::Decode {
			url: url.clone(),
			source,
		})?;
	info!(
		"fetched topology: {} devices, {} links",
		topology.nodes.len(),
		topology.links.len()
	);
	Ok(topology)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn appends_nocache_parameter() {
		assert_eq!(
			cache_busted_url("/data/network.json", 42),
			"/data/network.json?nocache=42"
		);
		assert_eq!(
			cache_busted_url("/api/topology?site=3", 7),
			"/api/topology?site=3&nocache=7"
		);
	}

	#[test]
	fn stamps_strictly_increase() {
		let a = next_stamp(1_000);
		let b = next_stamp(1_000);
		let c = next_stamp(5);
		assert!(b > a);
		assert!(c > b);
	}
}
