//! atlas-edit — slice an image into a grid of cells, apply reversible
//! per-cell edits (erase, rotate by 90° multiples), and reassemble the
//! edited cells into an exportable atlas.
//!
//! The crate is transport-agnostic: [`store::ImageStore`] owns all state,
//! [`service`] exposes the request-level operations over it, and the CLI in
//! [`cli`] is just one driver of that facade.

#[macro_use]
pub mod logger;
pub mod cli;
pub mod error;
pub mod grid;
pub mod io;
pub mod ops;
pub mod renderer;
pub mod service;
pub mod store;
