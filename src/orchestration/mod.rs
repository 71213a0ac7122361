pub mod pipeline;

pub use pipeline::{ApiError, Pipeline};
