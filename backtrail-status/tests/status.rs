//! Status-bearing errors and their interop with the wrapping entrypoints.

use std::io;

use backtrail::{TraceError, Traced, cause, errorf, stack_trace, wrap, wrap_message};
use backtrail_status::{Code, HasStatusCode, StatusError, status_code, status_errorf};
use static_assertions::assert_impl_all;
use thiserror::Error;

assert_impl_all!(StatusError: Send, Sync);
assert_impl_all!(Code: Copy, Send, Sync);

#[derive(Debug, Error)]
#[error("disk said no")]
struct DiskFailure;

const THIS_FILE: &str = "status.rs";

fn first_frame(rendered: &str) -> &str {
    rendered.lines().next().unwrap_or("")
}

#[test]
fn new_carries_code_message_and_trace() {
    let err = StatusError::new(Code::InvalidArgument, "something wrong");
    assert_eq!(err.to_string(), "InvalidArgument: something wrong");
    assert_eq!(err.code(), Code::InvalidArgument);
    assert_eq!(status_code!(err), Code::InvalidArgument);

    let rendered = stack_trace(&err);
    assert!(
        first_frame(&rendered).contains(THIS_FILE),
        "unexpected first frame: {rendered}"
    );
}

#[test]
fn status_errorf_with_plain_cause_captures_here() {
    let err = status_errorf!(Code::Internal, "at someplace: {}", DiskFailure);
    assert_eq!(err.to_string(), "Internal: at someplace: disk said no");
    assert_eq!(status_code!(err), Code::Internal);
    assert!(first_frame(&stack_trace(&err)).contains(THIS_FILE));
}

#[test]
fn status_errorf_adopts_a_traced_cause() {
    let inner = TraceError::new("something wrong");
    let inner_trace = inner.stack().clone();

    let err = status_errorf!(Code::InvalidArgument, "at someplace: {}", inner);
    assert_eq!(
        err.to_string(),
        "InvalidArgument: at someplace: something wrong"
    );
    assert!(inner_trace.ptr_eq(err.stack()));
}

#[test]
fn status_code_defaults_to_unknown() {
    assert_eq!(status_code!(io::Error::other("plain")), Code::Unknown);
    assert_eq!(status_code!(TraceError::new("traced")), Code::Unknown);
}

#[test]
fn has_status_code_works_through_references() {
    let status = StatusError::new(Code::Aborted, "conflict");
    assert_eq!(status.status_code(), Code::Aborted);
    assert_eq!((&status).status_code(), Code::Aborted);
    assert_eq!(status_code!(&status), Code::Aborted);
}

#[test]
fn wrap_keeps_status_message_and_trace() {
    let status = StatusError::new(Code::Internal, "invariant broken");
    let trace = status.stack().clone();
    let message = status.to_string();

    let wrapped = wrap(status);
    assert_eq!(wrapped.to_string(), message);
    assert!(trace.ptr_eq(wrapped.stack()));
}

#[test]
fn wrap_message_annotates_without_moving_the_trace() {
    let status = StatusError::new(Code::NotFound, "no such user");
    let status_trace = status.stack().clone();

    let annotated = wrap_message(status, "handling request");
    assert_eq!(
        annotated.to_string(),
        "handling request: NotFound: no such user"
    );
    assert!(status_trace.ptr_eq(annotated.stack()));
}

#[test]
fn errorf_adopts_from_status_errors() {
    let status = StatusError::new(Code::Unavailable, "shard offline");
    let status_trace = status.stack().clone();

    let err = errorf!("retrying: {}", status);
    assert_eq!(err.to_string(), "retrying: Unavailable: shard offline");
    assert!(status_trace.ptr_eq(err.stack()));
}

#[test]
fn cause_keeps_the_code_prefix() {
    let status = StatusError::new(Code::DataLoss, "bits rotted");
    assert_eq!(cause(&status).to_string(), "DataLoss: bits rotted");
}

#[test]
fn into_trace_error_preserves_message_and_trace() {
    let status = StatusError::new(Code::PermissionDenied, "not yours");
    let trace = status.stack().clone();
    let message = status.to_string();

    let trail = TraceError::from(status);
    assert_eq!(trail.to_string(), message);
    assert!(trace.ptr_eq(trail.stack()));
}

#[test]
fn numeric_conversions_saturate_to_unknown() {
    assert_eq!(Code::from(5u32), Code::NotFound);
    assert_eq!(u32::from(Code::NotFound), 5);
    assert_eq!(Code::from(1000u32), Code::Unknown);
}
