//! Runtime values.

mod value;

pub use value::{Literal, TypeSet, Value, ValueType};
