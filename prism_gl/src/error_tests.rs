//! Unit tests for error.rs
//!
//! Tests ErrorKind reasons, Error accessors, Display, and the error macros.

use crate::error::{Error, ErrorKind, Result, SourceLocation};

// ============================================================================
// ERROR KIND TESTS
// ============================================================================

#[test]
fn test_error_kind_reasons() {
    assert_eq!(ErrorKind::InvalidState.reason(), "invalid_state");
    assert_eq!(ErrorKind::InvalidArgument.reason(), "invalid_argument");
    assert_eq!(ErrorKind::CompileError.reason(), "compile_error");
    assert_eq!(ErrorKind::LinkError.reason(), "link_error");
    assert_eq!(ErrorKind::NameNotFound.reason(), "name_not_found");
    assert_eq!(ErrorKind::KeyNotFound.reason(), "key_not_found");
    assert_eq!(ErrorKind::IoError.reason(), "io_error");
    assert_eq!(ErrorKind::FormatError.reason(), "format_error");
    assert_eq!(ErrorKind::BackendError.reason(), "backend_error");
}

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_error_display_contains_reason_and_message() {
    let err = Error::new(ErrorKind::NameNotFound, "no binding named 'albedo'");
    let display = format!("{}", err);
    assert_eq!(display, "name_not_found: no binding named 'albedo'");
}

#[test]
fn test_error_without_location() {
    let err = Error::new(ErrorKind::IoError, "disk full");
    assert!(err.location().is_none());
    assert_eq!(err.message(), "disk full");
    assert_eq!(err.kind(), ErrorKind::IoError);
}

#[test]
fn test_error_is_std_error() {
    let err = Error::new(ErrorKind::FormatError, "truncated");
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone() {
    let err1 = Error::new(ErrorKind::LinkError, "undefined symbol");
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
    assert_eq!(err1.kind(), err2.kind());
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_prism_err_captures_location() {
    let err = crate::prism_err!(InvalidState, "prism::Test", "handle {} is not initialized", 3);

    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.message(), "handle 3 is not initialized");

    let location = err.location().expect("prism_err! records its call site");
    assert!(location.file.ends_with("error_tests.rs"));
    assert!(location.line > 0);
    assert_eq!(location.function, Some("prism_gl::error::tests::test_prism_err_captures_location"));
}

#[test]
fn test_location_function_skips_closures() {
    let location = (|| crate::prism_location!())();
    assert_eq!(location.function, Some("prism_gl::error::tests::test_location_function_skips_closures"));
    assert!(location.to_string().ends_with("(prism_gl::error::tests::test_location_function_skips_closures)"));
}

#[test]
fn test_caller_location() {
    #[track_caller]
    fn site() -> SourceLocation {
        SourceLocation::caller()
    }

    let line = line!() + 1;
    let location = site();
    assert!(location.file.ends_with("error_tests.rs"));
    assert_eq!(location.line, line);
    assert_eq!(location.function, None);
    assert_eq!(location.to_string(), format!("{}:{}", location.file, line));
}

#[test]
fn test_prism_bail_returns_early() {
    fn fails(flag: bool) -> Result<u32> {
        if flag {
            crate::prism_bail!(InvalidArgument, "prism::Test", "flag was set");
        }
        Ok(7)
    }

    assert_eq!(fails(false).unwrap(), 7);
    let err = fails(true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ============================================================================
// ERROR PROPAGATION TESTS
// ============================================================================

#[test]
fn test_error_propagation_with_question_mark() {
    fn inner() -> Result<i32> {
        Err(Error::new(ErrorKind::KeyNotFound, "missing"))
    }

    fn outer() -> Result<i32> {
        inner()?;
        Ok(42)
    }

    assert_eq!(outer().unwrap_err().kind(), ErrorKind::KeyNotFound);
}
