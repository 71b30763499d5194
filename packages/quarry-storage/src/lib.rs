pub mod models;
pub mod procedure;

mod error;

pub use error::{Error, Result};
