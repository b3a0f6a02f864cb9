//! Source decoders.
//!
//! - shared field rules (`fields`)
//! - wide country tables and their writer (`wide`)
//! - narrow aggregate/municipality/province tables (`narrow`)
//! - nested JSON timelines (`timeline`)
//!
//! Every parser takes any `Read` and returns a fully built history or the first
//! error it meets.

pub mod fields;
pub mod narrow;
pub mod timeline;
pub mod wide;

pub use narrow::*;
pub use timeline::*;
pub use wide::*;
