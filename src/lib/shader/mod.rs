//! Translation of shading network connections into renderer-side attributes.

pub mod connection;
pub mod graph;
pub mod param;

mod extract;

pub use connection::{ConnectionEdge, ConnectionSet, SourceRef};
pub use graph::Translator;
pub use param::ParameterPath;
