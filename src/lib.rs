pub mod error;
pub mod math;
pub mod store;

// Convenience re-exports
pub use error::{MatrixError, Result};
pub use math::distribution::{sample_normal, UniformSource};
pub use math::matrix::{Matrix, RawMatrix};
pub use store::config::StoreConfig;
pub use store::store::MatrixStore;
