//! Post-compile artifact handling for docbuild.
//!
//! - [`cleanup`] — strip compiler by-products from the output directory
//! - [`copy_artifacts`] — gather PDFs built next to their sources
//! - [`write_index`] — the static HTML index of all documents

mod files;
mod index;

pub use files::{cleanup, copy_artifacts};
pub use index::{render_index, write_index};
