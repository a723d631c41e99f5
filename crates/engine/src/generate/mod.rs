//! Artifact generation.
//!
//! Every generator in this module is a pure function from config
//! snapshots to artifact bytes; the same snapshot always yields the
//! same bytes. Deciding *which* artifacts a mutation invalidates is
//! the classifier's job, and getting the bytes onto disk atomically
//! is the writer's.

pub mod classifier;
pub mod pages;
pub mod script;
pub mod stylesheet;
pub mod writer;

pub use classifier::{ArtifactSet, Mutation, PageRef, PageSet};
pub use writer::StagedArtifact;
