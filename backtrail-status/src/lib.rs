#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Status-code-bearing traceable errors for the [`backtrail`] library.
//!
//! A [`StatusError`] pairs a machine-readable [`Code`] with a
//! [`backtrail::TraceError`], so one value answers both questions at once:
//! *what should the caller signal?* (the code) and *where did it actually go
//! wrong?* (the trace). Construction follows backtrail's adopt-or-capture
//! rule: a traced argument lends its stack trace, anything else triggers a
//! fresh capture at the construction site.
//!
//! The code set mirrors the canonical RPC status numbering, but this crate
//! binds to no transport; mapping a [`Code`] onto a wire protocol is the
//! caller's concern.
//!
//! # Quick Start
//!
//! ```rust
//! use backtrail::stack_trace;
//! use backtrail_status::{Code, StatusError, status_code, status_errorf};
//!
//! fn lookup(user: &str) -> Result<(), StatusError> {
//!     Err(StatusError::new(
//!         Code::NotFound,
//!         format!("no such user: {user}"),
//!     ))
//! }
//!
//! let err = lookup("alice").unwrap_err();
//! assert_eq!(status_code!(err), Code::NotFound);
//! assert_eq!(err.to_string(), "NotFound: no such user: alice");
//! assert_ne!(stack_trace(&err), "");
//!
//! // Re-wording keeps the original trace:
//! let annotated = status_errorf!(Code::Internal, "handling request: {}", err);
//! assert_eq!(status_code!(annotated), Code::Internal);
//! ```

use std::{error::Error, fmt};

use backtrail::{StackTrace, TraceError, Traceable, Traced};

/// A canonical machine-readable status code.
///
/// Numbering and names follow the widely-used RPC convention (`Ok = 0`
/// through `Unauthenticated = 16`); `Display` renders the conventional
/// CamelCase name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Code {
    /// Not an error.
    Ok = 0,
    /// The operation was cancelled, typically by the caller.
    Cancelled = 1,
    /// Unknown error, or an error from an unrecognized source.
    Unknown = 2,
    /// The client specified an invalid argument.
    InvalidArgument = 3,
    /// The deadline expired before the operation could complete.
    DeadlineExceeded = 4,
    /// A requested entity was not found.
    NotFound = 5,
    /// The entity a client attempted to create already exists.
    AlreadyExists = 6,
    /// The caller does not have permission to execute the operation.
    PermissionDenied = 7,
    /// Some resource has been exhausted.
    ResourceExhausted = 8,
    /// The system is not in a state required for the operation.
    FailedPrecondition = 9,
    /// The operation was aborted, typically due to a concurrency conflict.
    Aborted = 10,
    /// The operation was attempted past the valid range.
    OutOfRange = 11,
    /// The operation is not implemented or supported.
    Unimplemented = 12,
    /// An internal invariant was broken.
    Internal = 13,
    /// The service is currently unavailable.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The request lacks valid authentication credentials.
    Unauthenticated = 16,
}

impl Code {
    /// Converts a numeric code to its variant. Values outside the canonical
    /// range map to [`Code::Unknown`].
    #[must_use]
    pub fn from_u32(value: u32) -> Code {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }
}

impl From<u32> for Code {
    fn from(value: u32) -> Self {
        Code::from_u32(value)
    }
}

impl From<Code> for u32 {
    fn from(code: Code) -> Self {
        code as u32
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::Ok => "OK",
            Code::Cancelled => "Cancelled",
            Code::Unknown => "Unknown",
            Code::InvalidArgument => "InvalidArgument",
            Code::DeadlineExceeded => "DeadlineExceeded",
            Code::NotFound => "NotFound",
            Code::AlreadyExists => "AlreadyExists",
            Code::PermissionDenied => "PermissionDenied",
            Code::ResourceExhausted => "ResourceExhausted",
            Code::FailedPrecondition => "FailedPrecondition",
            Code::Aborted => "Aborted",
            Code::OutOfRange => "OutOfRange",
            Code::Unimplemented => "Unimplemented",
            Code::Internal => "Internal",
            Code::Unavailable => "Unavailable",
            Code::DataLoss => "DataLoss",
            Code::Unauthenticated => "Unauthenticated",
        };
        f.write_str(name)
    }
}

/// Capability trait for error values that carry a [`Code`].
///
/// Checking for this capability (via [`status_code!`]) is how callers extract
/// a code from an arbitrary error without downcasting.
pub trait HasStatusCode {
    /// The status code this error signals.
    fn status_code(&self) -> Code;
}

impl<T: HasStatusCode + ?Sized> HasStatusCode for &T {
    fn status_code(&self) -> Code {
        T::status_code(self)
    }
}

/// A traceable error that additionally carries a [`Code`].
///
/// One value, two capabilities: it implements [`HasStatusCode`] for status
/// extraction and [`backtrail::Traced`] / [`backtrail::Traceable`] for trace
/// inspection and adoption, so backtrail's wrapping entrypoints treat it
/// exactly like any other traced error.
///
/// `Display` renders `"{code}: {message}"`; the trace is retrieved
/// independently, as for [`TraceError`].
pub struct StatusError {
    code: Code,
    trail: TraceError,
}

impl StatusError {
    /// Creates a status-bearing traceable error, capturing the stack at the
    /// call site.
    #[cold]
    #[must_use]
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            trail: TraceError::from_parts(
                Box::new(StatusMessage {
                    code,
                    message: message.into(),
                }),
                backtrail::__private::record_stack(),
            ),
        }
    }

    /// The status code this error signals.
    #[must_use]
    pub fn code(&self) -> Code {
        self.code
    }
}

/// Discards the status capability, keeping message and trace intact.
impl From<StatusError> for TraceError {
    fn from(err: StatusError) -> Self {
        err.trail
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.trail, f)
    }
}

impl fmt::Debug for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusError")
            .field("code", &self.code)
            .field("trail", &self.trail)
            .finish()
    }
}

impl HasStatusCode for StatusError {
    fn status_code(&self) -> Code {
        self.code
    }
}

impl Traced for StatusError {
    fn stack(&self) -> &StackTrace {
        self.trail.stack()
    }
}

impl Traceable for StatusError {
    fn existing_trace(&self) -> Option<&StackTrace> {
        self.trail.existing_trace()
    }

    fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.trail.cause()
    }

    fn into_trace_error(self) -> TraceError {
        self.trail
    }
}

/// Underlying error for status-built messages.
#[derive(Debug)]
struct StatusMessage {
    code: Code,
    message: String,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for StatusMessage {}

/// Creates a [`StatusError`] with a formatted message.
///
/// The trace adoption rule is the same as [`backtrail::errorf!`]: the first
/// [`Traced`] argument, scanned left to right, lends its stack trace; when no
/// argument is traced, a new trace is captured at this call site. The code
/// never participates in adoption.
///
/// # Examples
///
/// ```rust
/// use backtrail::{TraceError, Traced};
/// use backtrail_status::{Code, status_code, status_errorf};
///
/// let inner = TraceError::new("something wrong");
/// let inner_trace = inner.stack().clone();
///
/// let err = status_errorf!(Code::InvalidArgument, "at someplace: {}", inner);
/// assert_eq!(status_code!(err), Code::InvalidArgument);
/// assert!(inner_trace.ptr_eq(err.stack()));
/// ```
#[macro_export]
macro_rules! status_errorf {
    ($code:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__status_errorf!(@args [] $code, $fmt $(, $arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __status_errorf {
    (@args [$($bound:tt)*] $code:expr, $fmt:literal, $head:expr $(, $tail:expr)*) => {{
        let arg = &$head;
        $crate::__status_errorf!(@args [$($bound)* arg] $code, $fmt $(, $tail)*)
    }};
    (@args [$($bound:ident)*] $code:expr, $fmt:literal) => {{
        #[allow(unused_imports)]
        use $crate::__private::kind::{PlainKind as _, TracedKind as _};
        #[allow(unused_mut)]
        let mut adopted = ::core::option::Option::None;
        $(
            if adopted.is_none() {
                adopted = (&&$crate::__private::kind::Probe($bound)).probe_trace();
            }
        )*
        $crate::__private::status_errorf_from_parts(
            $code,
            $crate::__private::format!($fmt $(, $bound)*),
            adopted,
        )
    }};
}

/// Extracts the [`Code`] from an arbitrary error value.
///
/// Yields the code of any value implementing [`HasStatusCode`] and
/// [`Code::Unknown`] for everything else, so callers can signal a status
/// without caring whether the error chain ever carried one.
///
/// # Examples
///
/// ```rust
/// use std::io;
///
/// use backtrail_status::{Code, StatusError, status_code};
///
/// let status = StatusError::new(Code::Unavailable, "shard offline");
/// assert_eq!(status_code!(status), Code::Unavailable);
///
/// let plain = io::Error::other("no status here");
/// assert_eq!(status_code!(plain), Code::Unknown);
/// ```
#[macro_export]
macro_rules! status_code {
    ($err:expr $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::__private::status_kind::{NoStatusKind as _, StatusKind as _};
        match (&&$crate::__private::kind::Probe(&$err)).probe_code() {
            ::core::option::Option::Some(code) => code,
            ::core::option::Option::None => $crate::Code::Unknown,
        }
    }};
}

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    pub use backtrail::__private::{format, kind};
    use backtrail::{StackTrace, TraceError};

    use crate::{Code, StatusError, StatusMessage};

    #[doc(hidden)]
    #[cold]
    #[must_use]
    pub fn status_errorf_from_parts(
        code: Code,
        message: String,
        adopted: Option<StackTrace>,
    ) -> StatusError {
        let trace = adopted.unwrap_or_else(backtrail::__private::record_stack);
        StatusError {
            code,
            trail: TraceError::from_parts(Box::new(StatusMessage { code, message }), trace),
        }
    }

    /// Autoref-specialization probes for [`status_code!`], mirroring
    /// backtrail's trace probes.
    pub mod status_kind {
        use backtrail::__private::kind::Probe;

        use crate::{Code, HasStatusCode};

        #[doc(hidden)]
        pub trait StatusKind {
            fn probe_code(&self) -> Option<Code>;
        }

        impl<T: HasStatusCode + ?Sized> StatusKind for &Probe<'_, T> {
            #[inline(always)]
            fn probe_code(&self) -> Option<Code> {
                Some(self.0.status_code())
            }
        }

        #[doc(hidden)]
        pub trait NoStatusKind {
            fn probe_code(&self) -> Option<Code>;
        }

        impl<T: ?Sized> NoStatusKind for Probe<'_, T> {
            #[inline(always)]
            fn probe_code(&self) -> Option<Code> {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_numbering_round_trips() {
        for value in 0u32..=16 {
            let code = Code::from_u32(value);
            assert_eq!(u32::from(code), value);
        }
        assert_eq!(Code::from_u32(99), Code::Unknown);
    }

    #[test]
    fn code_names_follow_convention() {
        assert_eq!(Code::Ok.to_string(), "OK");
        assert_eq!(Code::InvalidArgument.to_string(), "InvalidArgument");
        assert_eq!(Code::Unauthenticated.to_string(), "Unauthenticated");
    }
}
