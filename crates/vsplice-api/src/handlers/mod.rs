//! API request handlers.

pub mod health;
pub mod insert;
pub mod process;

pub use health::{health, ready};
pub use insert::upload_insert;
pub use process::process_batch;
