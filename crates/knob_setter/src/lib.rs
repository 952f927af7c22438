//! Pushes a typed-in value onto every node of a class, coercing the
//! text per knob kind and matching it against the knob's array length.

pub mod apply;
pub mod coercion;

pub use apply::{apply_value_to_class, ApplyReport};
pub use coercion::{tokenize, CoerceFn, CoercionTable};
