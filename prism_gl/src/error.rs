//! Error types for Prism GL
//!
//! Every failure surfaces as an [`Error`] carrying a machine-readable kind,
//! a human message and, when raised through [`prism_err!`](crate::prism_err)
//! or [`prism_bail!`](crate::prism_bail), the source location that raised it.

use std::fmt;

/// Result type for Prism GL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operation on an uninitialized or wrongly mapped resource
    InvalidState,

    /// Malformed request (empty stage list, undersized data, ...)
    InvalidArgument,

    /// The native compiler rejected a shader stage
    CompileError,

    /// The native linker rejected a program
    LinkError,

    /// Symbolic resource name absent from a program's binding table
    NameNotFound,

    /// Cache key absent from a program cache
    KeyNotFound,

    /// Cache file could not be read or written
    IoError,

    /// Cache file is structurally invalid
    FormatError,

    /// The native API failed (allocation returned no name, ...)
    BackendError,
}

impl ErrorKind {
    /// Machine-readable reason string
    pub fn reason(&self) -> &'static str {
        match self {
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::CompileError => "compile_error",
            ErrorKind::LinkError => "link_error",
            ErrorKind::NameNotFound => "name_not_found",
            ErrorKind::KeyNotFound => "key_not_found",
            ErrorKind::IoError => "io_error",
            ErrorKind::FormatError => "format_error",
            ErrorKind::BackendError => "backend_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Where an error or diagnostic originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file
    pub file: &'static str,
    /// Source line
    pub line: u32,
    /// Path of the enclosing function, when captured by `prism_location!`
    pub function: Option<&'static str>,
}

impl SourceLocation {
    /// Call site of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }

    /// Strip the marker item and closure segments off a type name
    #[doc(hidden)]
    pub fn enclosing_function(marker_path: &'static str) -> &'static str {
        let mut name = marker_path.strip_suffix("::__prism_here").unwrap_or(marker_path);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function {
            Some(function) => write!(f, "{}:{} ({})", self.file, self.line, function),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// Prism GL error
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    location: Option<SourceLocation>,
}

impl Error {
    /// Create an error without provenance
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Attach the location that raised this error
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Machine-readable reason (e.g. `"compile_error"`)
    pub fn reason(&self) -> &'static str {
        self.kind.reason()
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provenance, if the error was raised through `prism_err!`
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.reason(), self.message)
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Capture the current source location and enclosing function
#[macro_export]
macro_rules! prism_location {
    () => {{
        fn __prism_here() {}
        fn __prism_type_name<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::prism::SourceLocation {
            file: file!(),
            line: line!(),
            function: Some($crate::prism::SourceLocation::enclosing_function(__prism_type_name(__prism_here))),
        }
    }};
}

/// Build an [`Error`] of the given kind, log it at ERROR severity and
/// return it
///
/// # Example
///
/// ```no_run
/// # use prism_gl::prism_err;
/// let err = prism_err!(KeyNotFound, "prism::ProgramCache", "no program for key '{}'", "k");
/// assert_eq!(err.reason(), "key_not_found");
/// ```
#[macro_export]
macro_rules! prism_err {
    ($kind:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        let kind = $crate::prism::ErrorKind::$kind;
        $crate::prism_error!($source, "{}: {}", kind.reason(), message);
        $crate::prism::Error::new(kind, message).with_location($crate::prism_location!())
    }};
}

/// Return early with a logged [`Error`]
#[macro_export]
macro_rules! prism_bail {
    ($kind:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::prism_err!($kind, $source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
