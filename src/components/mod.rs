pub mod details_panel;
pub mod topology_map;
