//! Failure types for one refresh cycle.

use thiserror::Error;

/// The topology snapshot could not be obtained or parsed.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("request to {url} failed: {source}")]
	Transport {
		url: String,
		#[source]
		source: gloo_net::Error,
	},
	#[error("{url} responded with HTTP {status}")]
	Status { url: String, status: u16 },
	#[error("could not decode topology from {url}: {source}")]
	Decode {
		url: String,
		#[source]
		source: serde_json::Error,
	},
}

/// The snapshot parsed but is missing data the graph needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
	#[error("{entity} #{index} is missing required field `{field}`")]
	MissingField {
		entity: &'static str,
		index: usize,
		field: &'static str,
	},
	#[error("link #{index} connects `{address}` to itself")]
	SelfLink { index: usize, address: String },
}

/// Anything that aborts a refresh before the new graph is shown.
#[derive(Debug, Error)]
pub enum RefreshError {
	#[error(transparent)]
	Fetch(#[from] FetchError),
	#[error(transparent)]
	Topology(#[from] TopologyError),
}
