/// GL debug output - routes driver messages into a DiagnosticContext
///
/// The callback is installed synchronous so that a message is delivered on
/// the thread and inside the call that raised it, which is what lets the
/// context attach the innermost build scope.

use std::sync::Arc;

use colored::*;
use glow::HasContext;
use prism_gl::prism::diagnostics::{DiagnosticContext, DiagnosticMessage};
use prism_gl::prism_debug;

use crate::glow_format::{debug_kind_from_gl, debug_severity_from_gl, debug_source_from_gl};

/// Enable GL debug output and forward every message to `diagnostics`
///
/// Does nothing when the context is disabled.
pub(crate) fn install_debug_callback(gl: &mut glow::Context, diagnostics: Arc<DiagnosticContext>) {
    if !diagnostics.is_enabled() {
        return;
    }

    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(move |source, kind, id, severity, message| {
            if route_message(&diagnostics, source, kind, id, severity, message) {
                eprintln!("\n{}\n", "BREAK ON GL ERROR - Aborting execution".red().bold());
                std::process::abort();
            }
        });
    }

    prism_debug!("prism::GlowGraphicsDevice", "GL debug output enabled");
}

/// Translate one raw GL debug message and emit it
///
/// Returns `true` when the context asks to break on this message.
pub(crate) fn route_message(
    diagnostics: &DiagnosticContext,
    source: u32,
    kind: u32,
    id: u32,
    severity: u32,
    text: &str,
) -> bool {
    diagnostics.emit(DiagnosticMessage::new(
        debug_source_from_gl(source),
        debug_kind_from_gl(kind),
        debug_severity_from_gl(severity),
        id,
        text,
    ))
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
