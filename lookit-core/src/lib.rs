pub mod age;
pub mod forms;
pub mod html;
pub mod query;
pub mod urls;

pub use age::{AgeRange, CompositeAge};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no route named '{0}' to reverse")]
    NoReverseMatch(String),
    #[error("JSON serialization error: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
}
