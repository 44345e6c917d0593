pub mod config;
pub mod store;

pub use config::StoreConfig;
pub use store::{parse_rows, write_rows, MatrixStore};
