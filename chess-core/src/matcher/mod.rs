//! The matching and classification layer (§2 C9-C13): textual/positional
//! variation matching, ECO classification, duplicate detection, and
//! material-ending matching.

pub mod duplicates;
pub mod eco;
pub mod endings;
pub mod positional;
pub mod textual;
