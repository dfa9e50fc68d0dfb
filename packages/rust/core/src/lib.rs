//! Compilation and build orchestration for docbuild.
//!
//! This crate ties together source discovery, the per-format compilers, and
//! the artifact steps (cleanup, copy, index) into one build (`run_build`).

pub mod bibliography;
pub mod directory;
pub mod latex;
pub mod markdown;
pub mod pipeline;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;
