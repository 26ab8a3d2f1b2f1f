//! Release metadata module
//!
//! Category codes, checksum extraction and input file resolution.

pub mod category;
pub mod checksum;
pub mod inputs;

pub use category::Category;
pub use checksum::{extract_checksum, resolve_checksum};
pub use inputs::{resolve_explicit, resolve_local, ResolvedInputs};
