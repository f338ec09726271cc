//! Step definitions for Cucumber BDD tests
//!
//! Every step is forwarded to the library's step binder, which owns the
//! phrase table; cucumber only supplies the keyword and text.

pub mod given;
pub mod then;
pub mod when;
