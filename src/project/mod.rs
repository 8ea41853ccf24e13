//! Project generation: bundle model, response extraction, and on-disk materialization.

pub mod extract;
pub mod generator;
pub mod materialize;
pub mod model;
pub mod writer;

pub use generator::{GenerateRequest, ProjectGenerator};
