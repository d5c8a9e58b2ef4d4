//! Scene-graph data handed over by model loaders
//!
//! - [`Model`]: a loaded model with a root transform and named nodes
//! - [`Node`]: a named node that clip tracks can target
//! - [`Transform`]: TRS component with cached local/world matrices

pub mod model;
pub mod node;
pub mod transform;

pub use model::{Model, Units};
pub use node::Node;
pub use transform::Transform;
