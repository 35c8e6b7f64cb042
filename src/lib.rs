#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Traceable errors: ordinary error values augmented with a stack trace
//! captured once, at the point the chain began, and rendered through
//! customizable frame layouts.
//!
//! ## Overview
//!
//! Wrapping an error with this crate records where the failure actually
//! happened. Every construction and wrapping entrypoint follows a single
//! rule: **if the input already carries a trace, adopt it; otherwise capture
//! a new one at the call site**. However many times an error is re-wrapped or
//! annotated afterwards, its chain holds exactly one trace, anchored at the
//! original failure site.
//!
//! ```rust
//! use backtrail::{TraceError, errorf, stack_trace};
//!
//! fn bar() -> TraceError {
//!     TraceError::new("something wrong") // trace captured here
//! }
//!
//! fn foo() -> TraceError {
//!     let err = bar();
//!     errorf!("failed to call bar: {}", err) // adopts bar's trace
//! }
//!
//! let err = foo();
//! assert_eq!(err.to_string(), "failed to call bar: something wrong");
//! println!("{}", stack_trace(&err)); // frames start inside `bar`
//! ```
//!
//! ## Wrapping and inspection
//!
//! - [`TraceError::new`] — new message, new trace.
//! - [`errorf!`] — formatted message; adopts the trace of the first
//!   [`Traced`] argument, else captures.
//! - [`wrap`] — idempotent: a traceable input is returned unchanged, a plain
//!   input gets a trace captured at the wrap site.
//! - [`wrap_message`] / [`wrap_messagef!`] — prefix the message with an
//!   annotation; the trace site never moves.
//! - [`stack_trace`] — renders the trace (empty string for plain errors);
//!   [`cause`] — the underlying error, pass-through for plain errors.
//!
//! The message and the trace are always retrieved independently: `Display`
//! never includes frames, and a rendered trace never includes the message.
//!
//! ## Layouts
//!
//! A [`Formatter`] is a per-frame template over the tokens `{fn}`, `{file}`,
//! and `{line}`. Presets are provided, and [`apply_formatter`] replaces the
//! process-wide default used by [`stack_trace`]:
//!
//! ```rust
//! use backtrail::{Formatter, apply_formatter};
//!
//! apply_formatter(Formatter::GO_LIKE);
//! ```
//!
//! Rendering always uses the layout active at render time, not a layout
//! frozen when the trace was captured.
//!
//! ## Capture model
//!
//! Capture stores up to 64 opaque, unresolved frames; symbols, files, and
//! lines are resolved lazily when a trace is rendered. Frames belonging to
//! this crate's own entrypoints are hidden from the rendered output, so the
//! first frame is the application call site. Capture never fails; a stack the
//! runtime cannot walk renders as the empty string.
//!
//! ## Status-bearing errors
//!
//! The companion crate `backtrail-status` layers a machine-readable status
//! code on top of [`TraceError`], following the same adopt-or-capture rule
//! while staying inspectable as both a status carrier and a traced error.

#[macro_use]
mod macros;

mod error;
mod format;
mod trace;

pub mod prelude;

pub use self::{
    error::{TraceError, Traceable, Traced, cause, stack_trace, wrap, wrap_message},
    format::{Formatter, apply_formatter},
    trace::StackTrace,
};

// Not public API. Referenced by macro-generated code and backtrail-status.
#[doc(hidden)]
pub mod __private {
    pub use std::format;

    use crate::{StackTrace, TraceError};

    #[doc(hidden)]
    #[cold]
    #[must_use]
    pub fn errorf_from_parts(message: String, adopted: Option<StackTrace>) -> TraceError {
        crate::error::message_error_from_parts(message, adopted)
    }

    /// Captures the current stack. Used by decorator crates that assemble
    /// their own wrappers through [`TraceError::from_parts`].
    #[doc(hidden)]
    #[cold]
    #[must_use]
    pub fn record_stack() -> StackTrace {
        StackTrace::capture()
    }

    /// Autoref-specialization probes used by the formatted-construction
    /// macros to ask "does this argument already carry a trace?" without
    /// requiring any trait implementation on plain arguments.
    pub mod kind {
        use crate::{StackTrace, Traced};

        #[doc(hidden)]
        #[derive(Copy, Clone)]
        pub struct Probe<'a, T: ?Sized>(pub &'a T);

        #[doc(hidden)]
        pub trait TracedKind {
            fn probe_trace(&self) -> Option<StackTrace>;
        }

        impl<T: Traced + ?Sized> TracedKind for &Probe<'_, T> {
            #[inline(always)]
            fn probe_trace(&self) -> Option<StackTrace> {
                Some(self.0.stack().clone())
            }
        }

        #[doc(hidden)]
        pub trait PlainKind {
            fn probe_trace(&self) -> Option<StackTrace>;
        }

        impl<T: ?Sized> PlainKind for Probe<'_, T> {
            #[inline(always)]
            fn probe_trace(&self) -> Option<StackTrace> {
                None
            }
        }
    }
}
