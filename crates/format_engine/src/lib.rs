//! Format Engine - applies and removes rich-text formatting on a document tree
//!
//! The engine toggles three kinds of formats against the host selection:
//! inline formats (`b`, `i`, `sub`) that wrap text, block formats (`h1`,
//! `pre`, `blockquote`) that rename or nest a line's block element, and
//! style formats (`text-align`) that set properties on the nearest eligible
//! container. Every toggle is dispatched on the shape of the selection:
//! table cells, caret, single node, single line or several lines.
//!
//! A read-only [`FormatDetector`] reports which formats are active at the
//! caret after each selection change.

mod block_processor;
mod caret;
mod config;
mod detector;
mod error;
mod executor;
mod format;
mod history;
mod inline_processor;
mod marker;
mod processor;
mod range;
mod registry;
mod style_processor;
mod surgery;
mod toggler;

pub use block_processor::*;
pub use caret::*;
pub use config::*;
pub use detector::*;
pub use error::*;
pub use executor::*;
pub use format::*;
pub use history::*;
pub use inline_processor::*;
pub use marker::*;
pub use processor::*;
pub use range::*;
pub use registry::*;
pub use style_processor::*;
pub use surgery::*;
pub use toggler::*;
