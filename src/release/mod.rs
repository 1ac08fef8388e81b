//! Release assembly
//!
//! This module turns produced packages into one submission:
//! - Release descriptions with source and method provenance
//! - The ordered payload (primary package first)
//! - Flattening into the remote form's primary + extra slot layout

pub mod assembler;

pub use assembler::{
    assemble, release_description, AssemblyError, FormField, FormValue, ProducedPackage,
    SubmissionPayload,
};
