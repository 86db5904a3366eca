//! voltc-util - Shared infrastructure for the Volt compiler front-end.
//!
//! This crate hosts the types every phase needs: source spans, the
//! diagnostic sink, the logging backend, and typed index vectors used for
//! arena-style storage in the analyzer.

pub mod diagnostic;
pub mod index_vec;
pub mod logger;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use logger::VoltLogger;
pub use span::Span;
