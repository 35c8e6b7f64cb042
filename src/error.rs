//! The traceable error wrapper and its capability traits.
//!
//! Every error value is either *plain* (no trace) or *traceable* (exactly one
//! trace). All wrapping entrypoints follow one rule: if the input already
//! carries a trace, adopt it; otherwise capture a new one at the call site.

use std::{error::Error, fmt};

use crate::{format::Formatter, trace::StackTrace};

/// Capability trait for error values that carry a captured stack trace.
///
/// Implemented by [`TraceError`] and by status-bearing wrappers layered on
/// top of it. Checking for this capability is how the wrapping entrypoints
/// (and the [`errorf!`](crate::errorf) argument scan) decide between adopting
/// an existing trace and capturing a fresh one.
pub trait Traced {
    /// The stack trace captured when this error chain began.
    fn stack(&self) -> &StackTrace;
}

impl<T: Traced + ?Sized> Traced for &T {
    fn stack(&self) -> &StackTrace {
        T::stack(self)
    }
}

/// An error value paired with exactly one [`StackTrace`].
///
/// The trace is recorded when the chain begins: at [`TraceError::new`], or at
/// the first [`wrap`] of a plain error. Wrapping a `TraceError` again never
/// records a second trace.
///
/// `Display` renders the message only, never the trace; the trace is
/// retrieved independently through [`stack_trace`] or [`Traced::stack`].
/// Combining both is the caller's responsibility.
///
/// Two `TraceError`s are never interchangeable even when their messages
/// match: each value carries its own capture context, and the type
/// deliberately implements neither `PartialEq` nor `std::error::Error`. The
/// latter is what keeps the blanket [`Traceable`] implementation for plain
/// errors coherent, the same reason `anyhow::Error` is not a
/// `std::error::Error` itself.
///
/// # Examples
///
/// ```rust
/// use backtrail::{TraceError, stack_trace, wrap_message};
///
/// let inner = TraceError::new("connection refused");
/// let outer = wrap_message(inner, "loading profile");
/// assert_eq!(outer.to_string(), "loading profile: connection refused");
/// let trace = stack_trace(&outer); // anchored at the `new` call, not here
/// ```
pub struct TraceError {
    inner: Box<dyn Error + Send + Sync>,
    trace: StackTrace,
}

impl TraceError {
    /// Creates a traceable error with the given message, capturing the stack
    /// at the call site.
    #[cold]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            inner: Box::new(MessageError(message.into())),
            trace: StackTrace::capture(),
        }
    }

    /// Assembles a traceable error from an underlying error and an
    /// already-captured trace.
    ///
    /// This is the composition seam for wrappers that decorate `TraceError`
    /// with extra capabilities (such as a status code) while following the
    /// same adopt-or-capture rule.
    #[must_use]
    pub fn from_parts(inner: Box<dyn Error + Send + Sync>, trace: StackTrace) -> Self {
        Self { inner, trace }
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceError")
            .field("message", &format_args!("{}", self.inner))
            .field("trace", &self.trace)
            .finish()
    }
}

impl Traced for TraceError {
    fn stack(&self) -> &StackTrace {
        &self.trace
    }
}

/// The adopt-or-capture seam of the wrapping entrypoints.
///
/// Implemented in two tiers:
///
/// - a blanket implementation for every plain `E: std::error::Error + Send +
///   Sync + 'static`, which carries no trace and captures one when converted;
/// - implementations for [`TraceError`] (and decorators built on it), which
///   adopt the trace they already carry.
///
/// Dispatch is by trait satisfaction at compile time; no downcasting is
/// involved.
pub trait Traceable: fmt::Display {
    /// The trace this value already carries, if any.
    fn existing_trace(&self) -> Option<&StackTrace>;

    /// The underlying error for traceable values; the value itself for plain
    /// errors (pass-through identity).
    fn cause(&self) -> &(dyn Error + Send + Sync + 'static);

    /// Converts into a [`TraceError`], capturing a trace only if `self` does
    /// not already carry one.
    #[must_use]
    fn into_trace_error(self) -> TraceError
    where
        Self: Sized;
}

impl<E: Error + Send + Sync + 'static> Traceable for E {
    fn existing_trace(&self) -> Option<&StackTrace> {
        None
    }

    fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self
    }

    #[cold]
    fn into_trace_error(self) -> TraceError {
        TraceError::from_parts(Box::new(self), StackTrace::capture())
    }
}

impl Traceable for TraceError {
    fn existing_trace(&self) -> Option<&StackTrace> {
        Some(&self.trace)
    }

    fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.inner
    }

    fn into_trace_error(self) -> TraceError {
        self
    }
}

/// Wraps an error into a [`TraceError`].
///
/// Idempotent: wrapping an already-traceable error returns it unchanged,
/// preserving both its message and its original trace. Wrapping a plain error
/// captures a new trace at this call site.
///
/// # Examples
///
/// ```rust
/// use std::io;
///
/// use backtrail::wrap;
///
/// let err = wrap(io::Error::other("disk on fire"));
/// assert_eq!(err.to_string(), "disk on fire");
/// ```
#[must_use]
pub fn wrap<E: Traceable>(err: E) -> TraceError {
    err.into_trace_error()
}

/// Wraps an error, prefixing its message with `message` and a `": "`
/// separator.
///
/// The trace does not move: a traceable input keeps its original capture
/// site, a plain input gets a trace captured here.
///
/// # Examples
///
/// ```rust
/// use backtrail::{TraceError, wrap_message};
///
/// let err = wrap_message(TraceError::new("inner"), "outer");
/// assert_eq!(err.to_string(), "outer: inner");
/// ```
#[must_use]
pub fn wrap_message<E: Traceable>(err: E, message: impl fmt::Display) -> TraceError {
    let combined = format!("{message}: {err}");
    let trace = match err.existing_trace() {
        Some(trace) => trace.clone(),
        None => StackTrace::capture(),
    };
    TraceError::from_parts(Box::new(MessageError(combined)), trace)
}

/// Renders `err`'s stack trace with the layout active at the time of the
/// call, or returns the empty string if `err` carries no trace.
///
/// # Examples
///
/// ```rust
/// use std::io;
///
/// use backtrail::{TraceError, stack_trace};
///
/// assert_eq!(stack_trace(&io::Error::other("plain")), "");
/// assert_ne!(stack_trace(&TraceError::new("traced")), "");
/// ```
#[must_use]
pub fn stack_trace<E: Traceable + ?Sized>(err: &E) -> String {
    match err.existing_trace() {
        Some(trace) => trace.format(&Formatter::active()),
        None => String::new(),
    }
}

/// Returns the underlying error of a traceable value, or `err` itself
/// unchanged when it is plain.
///
/// The pass-through identity makes cause-unwrapping uniform regardless of
/// whether a trace was ever attached.
#[must_use]
pub fn cause<E: Traceable + ?Sized>(err: &E) -> &(dyn Error + Send + Sync + 'static) {
    err.cause()
}

/// Underlying error type for message-built wrappers.
#[derive(Debug)]
pub(crate) struct MessageError(pub(crate) String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

/// Builds a `TraceError` for a formatted message, adopting `adopted` when the
/// argument scan found a traceable argument and capturing here otherwise.
#[cold]
#[must_use]
pub(crate) fn message_error_from_parts(
    message: String,
    adopted: Option<StackTrace>,
) -> TraceError {
    let trace = adopted.unwrap_or_else(StackTrace::capture);
    TraceError::from_parts(Box::new(MessageError(message)), trace)
}
