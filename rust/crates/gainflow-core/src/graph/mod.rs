mod core;
pub mod matrix;

pub use self::core::{EdgeId, GainEdge, GainGraph, NodeId};
