//! Creates an error deep in a call chain, annotates it on the way up, and
//! prints the trace in a Go-panic-style layout. The printed frames start
//! inside `bar`, where the chain began, not at the `errorf!` call in `foo`.
//!
//! Run with `cargo run --example basic`.

use backtrail::{Formatter, TraceError, apply_formatter, errorf, stack_trace};

fn main() {
    apply_formatter(Formatter::GO_LIKE);

    let err = foo();
    println!("{err}");
    println!("{}", stack_trace(&err));
}

fn foo() -> TraceError {
    let err = bar();
    errorf!("failed to call bar: {}", err)
}

fn bar() -> TraceError {
    TraceError::new("something wrong")
}
