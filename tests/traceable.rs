//! Wrapping, adoption, and inspection behavior of traceable errors.
//!
//! Trace-content assertions stay loose on purpose: exact line numbers depend
//! on debug info, so tests check which file the first frame points at and how
//! captures are shared, not full rendered output.

use std::io;

use backtrail::{
    Formatter, StackTrace, TraceError, Traceable, Traced, cause, errorf, stack_trace, wrap,
    wrap_message, wrap_messagef,
};
use static_assertions::assert_impl_all;
use thiserror::Error;

assert_impl_all!(TraceError: Send, Sync);
assert_impl_all!(StackTrace: Send, Sync, Clone);

#[derive(Debug, Error)]
#[error("something wrong")]
struct SomethingWrong;

const THIS_FILE: &str = "traceable.rs";

fn first_frame(rendered: &str) -> &str {
    rendered.lines().next().unwrap_or("")
}

#[test]
fn new_captures_message_and_trace() {
    let err = TraceError::new("something wrong");
    assert_eq!(err.to_string(), "something wrong");

    let rendered = stack_trace(&err);
    assert!(
        first_frame(&rendered).contains(THIS_FILE),
        "unexpected first frame: {rendered}"
    );
}

#[test]
fn errorf_with_plain_arguments_captures_here() {
    let err = errorf!("{}", "something wrong");
    assert_eq!(err.to_string(), "something wrong");
    assert!(first_frame(&stack_trace(&err)).contains(THIS_FILE));
}

#[test]
fn errorf_supports_zero_arguments() {
    let err = errorf!("bare message");
    assert_eq!(err.to_string(), "bare message");
    assert!(first_frame(&stack_trace(&err)).contains(THIS_FILE));
}

#[test]
fn errorf_adopts_trace_of_traced_argument() {
    let inner = TraceError::new("something wrong");
    let inner_trace = inner.stack().clone();

    let outer = errorf!("failed to call bar: {}", inner);
    assert_eq!(outer.to_string(), "failed to call bar: something wrong");
    assert!(inner_trace.ptr_eq(outer.stack()));
}

#[test]
fn errorf_adopts_through_references() {
    let inner = TraceError::new("inner");
    let outer = errorf!("ctx: {}", &inner);
    assert!(inner.stack().ptr_eq(outer.stack()));
}

#[test]
fn errorf_first_traced_argument_wins() {
    let plain = io::Error::other("plain");
    let first = TraceError::new("first");
    let second = TraceError::new("second");
    let first_trace = first.stack().clone();

    let combined = errorf!("{} {} {} {}", 42, plain, first, second);
    assert!(first_trace.ptr_eq(combined.stack()));
    assert!(!second.stack().ptr_eq(combined.stack()));
}

#[test]
fn wrap_plain_error_captures_at_wrap_site() {
    let wrapped = wrap(SomethingWrong);
    assert_eq!(wrapped.to_string(), "something wrong");
    assert!(first_frame(&stack_trace(&wrapped)).contains(THIS_FILE));
}

#[test]
fn wrap_is_idempotent_for_traceable_errors() {
    let once = wrap(SomethingWrong);
    let trace = once.stack().clone();
    let message = once.to_string();

    let twice = wrap(once);
    assert_eq!(twice.to_string(), message);
    assert!(trace.ptr_eq(twice.stack()));
}

#[test]
fn repeated_wrapping_keeps_the_first_capture() {
    let origin = TraceError::new("inner");
    let origin_trace = origin.stack().clone();

    let chain = wrap_message(wrap_message(wrap_message(origin, "a"), "b"), "c");
    assert_eq!(chain.to_string(), "c: b: a: inner");
    assert!(origin_trace.ptr_eq(chain.stack()));
}

#[test]
fn wrap_message_prefixes_and_captures_for_plain_errors() {
    let wrapped = wrap_message(io::Error::other("something wrong"), "at someplace");
    assert_eq!(wrapped.to_string(), "at someplace: something wrong");
    assert!(first_frame(&stack_trace(&wrapped)).contains(THIS_FILE));
}

#[test]
fn wrap_message_does_not_move_the_trace_site() {
    let inner = TraceError::new("something wrong");
    let inner_trace = inner.stack().clone();

    let wrapped = wrap_message(inner, "at someplace");
    assert_eq!(wrapped.to_string(), "at someplace: something wrong");
    assert!(inner_trace.ptr_eq(wrapped.stack()));
}

#[test]
fn wrap_messagef_formats_the_prefix() {
    let wrapped = wrap_messagef!(
        io::Error::other("something wrong"),
        "at someplace {}",
        "here"
    );
    assert_eq!(wrapped.to_string(), "at someplace here: something wrong");

    let traced = wrap_messagef!(TraceError::new("inner"), "try {}", 2);
    assert_eq!(traced.to_string(), "try 2: inner");
}

#[test]
fn identical_messages_never_share_a_capture() {
    let one = TraceError::new("x");
    let two = TraceError::new("x");
    assert_eq!(one.to_string(), two.to_string());
    assert!(!one.stack().ptr_eq(two.stack()));
}

#[test]
fn cause_returns_the_underlying_error_for_traceable_values() {
    let err = wrap_message(TraceError::new("inner"), "outer");
    assert_eq!(cause(&err).to_string(), "outer: inner");
}

#[test]
fn cause_is_identity_for_plain_errors() {
    let plain = SomethingWrong;
    assert_eq!(cause(&plain).to_string(), "something wrong");
}

#[test]
fn plain_errors_render_an_empty_trace() {
    assert_eq!(stack_trace(&SomethingWrong), "");
}

#[test]
fn existing_trace_reports_the_capability() {
    assert!(SomethingWrong.existing_trace().is_none());
    assert!(TraceError::new("x").existing_trace().is_some());
}

#[test]
fn empty_trace_formats_to_empty_string_under_any_layout() {
    let empty = StackTrace::empty();
    assert_eq!(empty.format(&Formatter::FILE_LINE), "");
    assert_eq!(empty.format(&Formatter::JAVA_LIKE), "");
    assert_eq!(empty.format(&Formatter::new("{fn} {fn} {fn}")), "");
}

#[inline(never)]
fn deepest() -> TraceError {
    TraceError::new("deep failure")
}

#[inline(never)]
fn middle() -> TraceError {
    deepest()
}

#[test]
fn frames_render_in_capture_order() {
    let err = middle();
    let rendered = err.stack().format(&Formatter::JAVA_LIKE);

    let deepest_at = rendered.find("deepest").expect("deepest frame missing");
    let middle_at = rendered.find("middle").expect("middle frame missing");
    assert!(deepest_at < middle_at, "frames out of order:\n{rendered}");
}
