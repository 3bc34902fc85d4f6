//! Common types shared across `sealstore` crates: the tagged field value
//! model and the error taxonomy for the field encryption layer.

pub mod error;
pub mod value;

pub use error::FieldError;
pub use value::{DeclaredType, FieldValue};
