//! Frame layouts and the process-wide default layout.
//!
//! A [`Formatter`] is a template describing how a single resolved frame is
//! rendered. Three tokens are recognized, and each is substituted at its
//! first occurrence only:
//!
//! - `{fn}` — the demangled function name,
//! - `{file}` — the source file path,
//! - `{line}` — the line number.
//!
//! The process-wide default layout starts as [`Formatter::FILE_LINE`] and can
//! be replaced with [`apply_formatter`]. Rendering always looks up the layout
//! active at render time, so replacing the default affects every trace
//! rendered afterwards, including traces captured earlier.

use std::{
    borrow::Cow,
    fmt,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

static ACTIVE_LAYOUT: FormatterLock = FormatterLock::new();

/// A layout template rendering one stack frame.
///
/// # Examples
///
/// ```rust
/// use backtrail::{Formatter, TraceError, Traced};
///
/// let err = TraceError::new("something wrong");
///
/// // A preset layout:
/// let java_style = err.stack().format(&Formatter::JAVA_LIKE);
///
/// // A custom layout:
/// let custom = err.stack().format(&Formatter::new("{file}@{line} in {fn}\n"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formatter(Cow<'static, str>);

impl Formatter {
    /// `file.rs:152` on one line per frame. The initial process default.
    pub const FILE_LINE: Formatter = Formatter(Cow::Borrowed("{file}:{line}\n"));

    /// `at foo(file.rs:152)`, in the style of a Java exception trace.
    pub const JAVA_LIKE: Formatter = Formatter(Cow::Borrowed("at {fn}({file}:{line})\n"));

    /// Function name on its own line, indented `file.rs:152` below, in the
    /// style of a Go panic trace.
    pub const GO_LIKE: Formatter = Formatter(Cow::Borrowed("{fn}\n\t{file}:{line}\n"));

    /// `File file.rs, line 152, in foo`, in the style of a Python traceback.
    pub const PYTHON_LIKE: Formatter = Formatter(Cow::Borrowed("File {file}, line {line}, in {fn}\n"));

    /// Creates a layout from a template string.
    #[must_use]
    pub fn new(layout: impl Into<Cow<'static, str>>) -> Self {
        Self(layout.into())
    }

    /// Returns the process-wide default layout currently in effect.
    #[must_use]
    pub fn active() -> Self {
        ACTIVE_LAYOUT
            .read()
            .get()
            .cloned()
            .unwrap_or(Self::FILE_LINE)
    }

    /// The raw template string of this layout.
    #[must_use]
    pub fn layout(&self) -> &str {
        &self.0
    }

    /// Substitutes one resolved frame into the template. Each recognized
    /// token is replaced at its first occurrence only; a template that needs
    /// a token twice must be pre-processed by the caller.
    pub(crate) fn render_frame(&self, function: &str, file: &str, line: u32) -> String {
        let rendered = self.0.replacen("{fn}", function, 1);
        let rendered = rendered.replacen("{file}", file, 1);
        rendered.replacen("{line}", &line.to_string(), 1)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::FILE_LINE
    }
}

impl From<&'static str> for Formatter {
    fn from(layout: &'static str) -> Self {
        Self(Cow::Borrowed(layout))
    }
}

impl From<String> for Formatter {
    fn from(layout: String) -> Self {
        Self(Cow::Owned(layout))
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces the process-wide default layout.
///
/// Only affects renders that do not supply an explicit layout, and only those
/// that happen after the call. Concurrent replacements are last-writer-wins;
/// a render racing with a replacement observes either the old or the new
/// layout, never a torn one.
///
/// # Examples
///
/// ```rust
/// use backtrail::{Formatter, apply_formatter};
///
/// apply_formatter(Formatter::GO_LIKE);
/// ```
pub fn apply_formatter(layout: impl Into<Formatter>) {
    *ACTIVE_LAYOUT.write().get() = Some(layout.into());
}

/// Guarded storage for the process default layout. Configuration, not a hot
/// path: reads and writes both take the short critical section.
struct FormatterLock(RwLock<Option<Formatter>>);

struct FormatterLockReadGuard(RwLockReadGuard<'static, Option<Formatter>>);

struct FormatterLockWriteGuard(RwLockWriteGuard<'static, Option<Formatter>>);

impl FormatterLock {
    const fn new() -> Self {
        Self(RwLock::new(None))
    }

    #[inline]
    fn read(&'static self) -> FormatterLockReadGuard {
        FormatterLockReadGuard(self.0.read().expect("unable to acquire formatter lock"))
    }

    #[inline]
    fn write(&'static self) -> FormatterLockWriteGuard {
        FormatterLockWriteGuard(self.0.write().expect("unable to acquire formatter lock"))
    }
}

impl FormatterLockReadGuard {
    #[inline]
    fn get(&self) -> Option<&Formatter> {
        self.0.as_ref()
    }
}

impl FormatterLockWriteGuard {
    #[inline]
    fn get(&mut self) -> &mut Option<Formatter> {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_substitute_in_caller_order() {
        let layout = Formatter::new("at {fn}({file}:{line})\n");
        assert_eq!(
            layout.render_frame("known_fn", "known_file.rs", 152),
            "at known_fn(known_file.rs:152)\n"
        );
    }

    #[test]
    fn each_token_substitutes_once() {
        let layout = Formatter::new("{file} {file} {line}");
        assert_eq!(
            layout.render_frame("f", "a.rs", 7),
            "a.rs {file} 7"
        );
    }

    #[test]
    fn missing_tokens_leave_template_text() {
        let layout = Formatter::new("{line}!");
        assert_eq!(layout.render_frame("f", "a.rs", 3), "3!");
    }

    #[test]
    fn presets_match_their_documented_shapes() {
        assert_eq!(
            Formatter::GO_LIKE.render_frame("foo", "file.rs", 152),
            "foo\n\tfile.rs:152\n"
        );
        assert_eq!(
            Formatter::PYTHON_LIKE.render_frame("foo", "file.rs", 152),
            "File file.rs, line 152, in foo\n"
        );
        assert_eq!(
            Formatter::FILE_LINE.render_frame("foo", "file.rs", 152),
            "file.rs:152\n"
        );
    }
}
