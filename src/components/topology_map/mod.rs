mod builder;
mod component;
mod encode;
mod geometry;
mod layout;
mod render;
mod selection;
mod state;
mod types;

pub use builder::{LayoutGraph, build};
pub use component::TopologyCanvas;
pub use layout::LayoutParams;
pub use selection::SelectionEvent;
pub use state::{RefreshOutcome, RefreshSequence};
pub use types::{DeviceType, Metric, TopologyRecord};
