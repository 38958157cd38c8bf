//! Plant identification backend: classifies uploaded images with pretrained ONNX models
//! and joins the result against a CSV of plant details.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod labels;
pub mod models;
pub mod preprocess;
pub mod routes;
pub mod state;
