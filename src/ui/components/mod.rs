pub mod peer_feed;
pub mod progress_bar;
pub mod results_panel;
pub mod stats_header;
pub mod typing_area;
