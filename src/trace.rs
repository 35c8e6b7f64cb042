//! Stack capture and frame resolution.
//!
//! A [`StackTrace`] is recorded as a bounded list of unresolved frames, which
//! keeps capture cheap at the error site. Symbol names, file paths, and line
//! numbers are only resolved when the trace is rendered.

use std::{fmt, path::Path, sync::OnceLock};

use regex::Regex;
use triomphe::Arc;

use crate::format::Formatter;

/// Upper bound on the number of frames recorded per capture.
const MAX_FRAMES: usize = 64;

/// Crates whose frames are hidden when they appear at the start of a trace,
/// so the first rendered frame is the application call site rather than this
/// library's own capture machinery.
const SKIPPED_INITIAL_CRATES: &[&str] = &[
    "backtrace",
    "backtrail",
    "backtrail_status",
    "core",
    "std",
    "alloc",
];

/// Crates whose frames are hidden when they appear at the end of a trace.
const SKIPPED_FINAL_CRATES: &[&str] = &["std", "core", "alloc", "test"];

/// An immutable snapshot of the call stack, captured at one instant.
///
/// A trace is captured exactly once per logical error chain: wrapping an
/// already-traceable error shares the existing snapshot instead of recording a
/// new one. Cloning is a cheap reference-count bump, and the shared frame list
/// is never mutated after capture.
///
/// Rendering is lazy. The captured frames are opaque program-counter data;
/// [`StackTrace::format`] resolves them into function names, file paths, and
/// line numbers on demand.
///
/// # Examples
///
/// ```rust
/// use backtrail::{Formatter, TraceError, Traced};
///
/// let err = TraceError::new("something wrong");
/// let rendered = err.stack().format(&Formatter::JAVA_LIKE);
/// ```
#[derive(Clone)]
pub struct StackTrace {
    frames: Arc<Vec<backtrace::Frame>>,
}

impl StackTrace {
    /// Returns a trace with no frames.
    ///
    /// An empty trace is valid and renders to the empty string under every
    /// layout.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            frames: Arc::new(Vec::new()),
        }
    }

    /// Walks the active call stack and records up to [`MAX_FRAMES`] unresolved
    /// frames. Never fails; a stack the runtime cannot walk yields an empty
    /// snapshot.
    #[cold]
    #[inline(never)]
    #[must_use]
    pub(crate) fn capture() -> Self {
        let mut frames = Vec::with_capacity(MAX_FRAMES);
        backtrace::trace(|frame| {
            frames.push(frame.clone());
            frames.len() < MAX_FRAMES
        });
        Self {
            frames: Arc::new(frames),
        }
    }

    /// Reports whether two traces share the same captured snapshot.
    ///
    /// This is the observable form of the single-capture rule: every wrapper
    /// along one error chain answers `true` against the trace recorded at the
    /// original failure site.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backtrail::{TraceError, Traced, wrap};
    ///
    /// let inner = TraceError::new("boom");
    /// let inner_trace = inner.stack().clone();
    /// let outer = wrap(inner);
    /// assert!(inner_trace.ptr_eq(outer.stack()));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &StackTrace) -> bool {
        Arc::ptr_eq(&self.frames, &other.frames)
    }

    /// Renders the trace with the given layout, one rendered entry per
    /// resolved frame, in capture order: the failure site first, the outermost
    /// caller last.
    ///
    /// A frame the compiler inlined may expand to several rendered entries.
    /// Frames without symbol or source information are omitted, and an empty
    /// or unresolvable trace renders to the empty string. This never fails.
    #[must_use]
    pub fn format(&self, layout: &Formatter) -> String {
        let mut rendered = String::new();
        for frame in resolve_frames(&self.frames) {
            rendered.push_str(&layout.render_frame(&frame.function, &frame.file, frame.line));
        }
        rendered
    }
}

/// Renders with the layout active at the time of the call, not the layout
/// that was active at capture time.
impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&Formatter::active()))
    }
}

impl fmt::Debug for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackTrace")
            .field("captured_frames", &self.frames.len())
            .finish()
    }
}

/// A frame resolved to human-readable parts, ready for layout substitution.
struct ResolvedFrame {
    function: String,
    file: String,
    line: u32,
    runtime: bool,
}

fn resolve_frames(frames: &[backtrace::Frame]) -> Vec<ResolvedFrame> {
    let cwd = std::env::current_dir().ok();
    let cwd = cwd.as_deref();

    let mut resolved: Vec<ResolvedFrame> = Vec::new();
    let mut initial_filtering = true;

    for frame in frames {
        backtrace::resolve_frame(frame, |symbol| {
            let (Some(name), Some(filename)) = (symbol.name(), symbol.filename()) else {
                return;
            };
            let function = format!("{name:#}");

            if initial_filtering {
                if is_machinery_symbol(&function) {
                    return;
                }
                initial_filtering = false;
            }

            let crate_name = symbol_crate(&function);
            let runtime = SKIPPED_FINAL_CRATES.contains(&crate_name)
                || is_runtime_entry_symbol(&function)
                || is_runtime_path(filename);

            resolved.push(ResolvedFrame {
                file: display_path(cwd, filename),
                line: symbol.lineno().unwrap_or(0),
                function,
                runtime,
            });
        });
    }

    while resolved.last().is_some_and(|frame| frame.runtime) {
        resolved.pop();
    }
    resolved
}

/// Frames belonging to the capture and wrapping entrypoints themselves.
///
/// The `" as backtrail"` form matches monomorphized trait methods such as the
/// blanket `Traceable::into_trace_error`, whose symbols start with the
/// caller's own type.
fn is_machinery_symbol(function: &str) -> bool {
    SKIPPED_INITIAL_CRATES.contains(&symbol_crate(function))
        || function.contains("backtrail::")
        || function.contains("backtrail_status::")
}

fn symbol_crate(function: &str) -> &str {
    let function = function.trim_start_matches(['<', '&', ' ']);
    match function.find("::") {
        Some(split) => &function[..split],
        None => function,
    }
}

fn is_runtime_entry_symbol(function: &str) -> bool {
    matches!(
        function,
        "__rust_try"
            | "__libc_start_call_main"
            | "__libc_start_main_impl"
            | "__libc_start_main"
            | "_start"
            | "start_thread"
            | "__GI___clone3"
    )
}

/// Detects source paths inside the Rust toolchain's own library tree.
fn is_runtime_path(path: &Path) -> bool {
    static RUST_SRC: OnceLock<Regex> = OnceLock::new();
    let rust_src = RUST_SRC.get_or_init(|| {
        Regex::new(r"(?:/lib/rustlib/src/rust|^/rustc/[^/]+)/library/(?:std|core|alloc|test)/src/")
            .expect("rust-src path pattern is valid")
    });
    rust_src.is_match(&path.to_string_lossy())
}

/// Shortens a frame path for display: paths under the current directory are
/// made relative, and cargo-registry paths are stripped down to the
/// `crate-version/...` suffix.
fn display_path(cwd: Option<&Path>, path: &Path) -> String {
    if let Some(cwd) = cwd
        && let Ok(stripped) = path.strip_prefix(cwd)
    {
        return stripped.to_string_lossy().into_owned();
    }

    static REGISTRY: OnceLock<Regex> = OnceLock::new();
    let registry = REGISTRY.get_or_init(|| {
        Regex::new(r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/")
            .expect("cargo registry path pattern is valid")
    });

    let path = path.to_string_lossy();
    match registry.find(&path) {
        Some(prefix) => path[prefix.end()..].to_string(),
        None => path.into_owned(),
    }
}
