//! Algorithms on meshes.

pub mod direction_field;

pub use self::direction_field::{
    smoothest_vertex_direction_field,
    smoothest_vertex_direction_field_with,
    DirectionField,
    FieldError,
    FieldOptions,
};
