//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use backtrail::prelude::*;
//!
//! fn load() -> Result<(), TraceError> {
//!     Err(errorf!("failed to load {}", "profile"))
//! }
//!
//! if let Err(err) = load() {
//!     eprintln!("{err}");
//!     eprintln!("{}", stack_trace(&err));
//! }
//! ```

pub use crate::{
    Formatter, StackTrace, TraceError, Traceable, Traced, apply_formatter, cause, errorf,
    stack_trace, wrap, wrap_message, wrap_messagef,
};
