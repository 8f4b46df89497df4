pub mod adaptive_filter;
pub mod audio_graph;
pub mod levels;
