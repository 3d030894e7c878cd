//! Configuration source implementations.

mod env;

pub use env::{EnvSource, KNOWN_VARIABLES, RawSettings};
