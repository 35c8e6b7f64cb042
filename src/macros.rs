/// Creates a traceable error with a formatted message.
///
/// The arguments are scanned left to right for a value implementing
/// [`Traced`](crate::Traced). The first one found lends its stack trace to
/// the new error, so a call site that merely re-words an embedded cause keeps
/// pointing at the original failure site. When no argument is traced, a new
/// trace is captured at this call site.
///
/// Arguments are borrowed, evaluated once each, and formatted as
/// [`format!`] would format them. Positional and implicitly-captured
/// placeholders are supported; `name = value` arguments are not.
///
/// # Examples
///
/// ```rust
/// use backtrail::{TraceError, Traced, errorf};
///
/// let inner = TraceError::new("something wrong");
/// let inner_trace = inner.stack().clone();
///
/// let outer = errorf!("failed to call bar: {}", inner);
/// assert_eq!(outer.to_string(), "failed to call bar: something wrong");
/// assert!(inner_trace.ptr_eq(outer.stack()));
/// ```
#[macro_export]
macro_rules! errorf {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__errorf!(@args [] $fmt $(, $arg)*)
    };
}

/// Recursive helper for [`errorf!`]: binds each argument to a hygienic local
/// exactly once, so it can be probed for a trace and then formatted.
#[doc(hidden)]
#[macro_export]
macro_rules! __errorf {
    (@args [$($bound:tt)*] $fmt:literal, $head:expr $(, $tail:expr)*) => {{
        let arg = &$head;
        $crate::__errorf!(@args [$($bound)* arg] $fmt $(, $tail)*)
    }};
    (@args [$($bound:ident)*] $fmt:literal) => {{
        #[allow(unused_imports)]
        use $crate::__private::kind::{PlainKind as _, TracedKind as _};
        #[allow(unused_mut)]
        let mut adopted = ::core::option::Option::None;
        $(
            if adopted.is_none() {
                adopted = (&&$crate::__private::kind::Probe($bound)).probe_trace();
            }
        )*
        $crate::__private::errorf_from_parts(
            $crate::__private::format!($fmt $(, $bound)*),
            adopted,
        )
    }};
}

/// Wraps an error, prefixing its message with a formatted annotation.
///
/// Equivalent to [`wrap_message`](crate::wrap_message) with the prefix built
/// by [`format!`]. Only `err` participates in trace adoption; the format
/// arguments never do.
///
/// # Examples
///
/// ```rust
/// use std::io;
///
/// use backtrail::wrap_messagef;
///
/// let err = wrap_messagef!(io::Error::other("timed out"), "fetching shard {}", 7);
/// assert_eq!(err.to_string(), "fetching shard 7: timed out");
/// ```
#[macro_export]
macro_rules! wrap_messagef {
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::wrap_message($err, $crate::__private::format!($fmt $(, $arg)*))
    };
}
