//! Request validation and processor dispatch for collector-configuration
//! submissions
//!
//! This crate provides the submission handler shared by every transport
//! assembly: it validates the request shape, generates a correlation
//! identifier, hands the raw payload to registered processors, and renders
//! the JSON response envelope. What a processor does with the payload is
//! deliberately opaque here.

pub mod create;
pub mod processor;
pub mod response;

pub use create::{CreateConfig, CreateConfigBuilder, CONFIG_CONTENT_TYPE};
pub use processor::{ConfigStream, Processor};
pub use response::Response;
