//! Graph representation and algorithms module

pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use builder::{build_graph, GraphBuilder};
pub use compressed::SocialGraph;
