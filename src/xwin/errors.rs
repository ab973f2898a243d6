//! Protocol and I/O error handling.
//!
//! Handlers are handed to `Session::open` explicitly. Protocol errors are
//! reported and the connection stays usable; I/O errors are fatal.

use std::fmt::Display;

use x11rb::errors::ConnectionError;
use x11rb::x11_utils::X11Error;

/// Receives errors observed on the X11 connection.
pub trait ErrorHandler {
    /// A request failed on the server. The connection remains usable.
    fn protocol_error(&self, error: &X11Error);

    /// The transport failed. Implementations must not return.
    fn io_error(&self, error: &ConnectionError) -> !;
}

/// Reports protocol errors on stderr and dies on I/O errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrErrorHandler;

impl ErrorHandler for StderrErrorHandler {
    fn protocol_error(&self, error: &X11Error) {
        tracing::warn!(
            kind = ?error.error_kind,
            serial = error.sequence,
            error_code = error.error_code,
            request_code = error.major_opcode,
            minor_code = error.minor_opcode,
            request = error.request_name.unwrap_or("unknown"),
            "X11 protocol error"
        );
        eprintln!("{}", describe_protocol_error(error));
    }

    fn io_error(&self, error: &ConnectionError) -> ! {
        die(format!("Fatal X11 I/O error: {error}"))
    }
}

/// Single-line description of a protocol error.
pub fn describe_protocol_error(error: &X11Error) -> String {
    format!(
        "X11 ERROR: kind={:?}, serial={}, error_code={}, request_code={}, minor_code={}",
        error.error_kind, error.sequence, error.error_code, error.major_opcode, error.minor_opcode
    )
}

/// Print `DIE: <message>` to stderr and exit with status 1.
pub fn die(message: impl Display) -> ! {
    let message = message.to_string();
    // The DIE line is the user-facing diagnostic.
    tracing::debug!(reason = %message, "fatal error");
    eprintln!("DIE: {message}");
    std::process::exit(1)
}
