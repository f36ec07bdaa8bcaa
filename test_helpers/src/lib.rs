pub mod fixtures;
pub mod node;
