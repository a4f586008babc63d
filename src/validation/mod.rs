//! Prerequisite and resource validation

pub mod graph;
pub mod service;

pub use graph::PrerequisiteGraph;
pub use service::{StateDigest, ValidationIssue, ValidationResult, ValidationService};
