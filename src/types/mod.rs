//! Data types for xlmerge.

mod filter;
mod options;
mod record;

pub use filter::*;
pub use options::*;
pub use record::*;
