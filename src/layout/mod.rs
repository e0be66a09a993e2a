//! Layout machinery shared by the dimension strategies
//!
//! This module is organized into submodules:
//! - `defaults`: Default sizes and tuning constants
//! - `context`: LayoutContext and the per-segment fit state
//! - `fit`: Fit classification of text and terminators
//! - `text`: Text offsets, stacking and placement
//! - `segment`: Dimension lines, arcs and witness lines
//! - `terminator`: Glyph selection and placement
//! - `leader`: Ball-and-chain leaders
//! - `chain`: Per-segment driver

pub mod chain;
pub mod context;
pub mod defaults;
pub mod fit;
pub mod leader;
pub mod segment;
pub mod terminator;
pub mod text;

pub use chain::Chain;
pub use context::{FitState, LayoutContext};
pub use segment::ArcParams;
