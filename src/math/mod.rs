pub mod distribution;
pub mod matrix;

pub use distribution::{sample_normal, UniformSource};
pub use matrix::{Matrix, RawMatrix};
