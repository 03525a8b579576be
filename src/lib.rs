//! A small fully connected network that classifies hand-drawn sketches.
//!
//! Drawings go through [`translator::Translator`] to become a fixed-size
//! binary grid, [`neural::Network`] scores every category, and
//! [`labels::LabelRegistry`] names the winner. [`neural::stats`] trains a
//! network to a target accuracy and sweeps hidden-layer widths.

pub mod labels;
pub mod matrix;
pub mod neural;
pub mod prelude;
pub mod translator;
pub mod viz;
