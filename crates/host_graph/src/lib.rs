//! The host node graph as seen by the knob tools.
//!
//! Hosts hand out borrowed node and knob handles. Setting a value goes
//! through a shared handle, so implementations keep knob state behind
//! interior mutability.

use shared::{
    domain::{Coerced, FormatDescriptor, KnobKind},
    error::HostError,
};

pub mod gather;
pub mod scene;

pub use gather::{all_class_knobs, all_classes, find_all_knob_names, nodes_of_class};
pub use scene::{Scene, SceneError, SceneKnob, SceneNode};

pub trait FormatRegistry {
    fn list_formats(&self) -> Vec<FormatDescriptor>;
    fn default_format(&self) -> FormatDescriptor;
}

pub trait Knob {
    fn kind_tag(&self) -> KnobKind;
    /// Number of slots; 1 for scalar knobs.
    fn expected_arity(&self) -> usize;
    fn set_value(&self, value: Coerced) -> Result<(), HostError>;
}

pub trait GraphNode {
    fn name(&self) -> &str;
    fn class_name(&self) -> &str;
    fn parameter_names(&self) -> Vec<String>;
    fn get_parameter(&self, name: &str) -> Option<&dyn Knob>;
}

pub trait NodeGraph: FormatRegistry {
    /// Top-level nodes, or every node including group contents when
    /// `recursive` is set.
    fn enumerate_nodes(&self, recursive: bool) -> Vec<&dyn GraphNode>;
}
