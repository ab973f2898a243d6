//! X11 session: connection, splash window, listener dispatch.
//!
//! `run` is the entry point called from `main.rs`: open the session with
//! the stderr error handler, register the stock listeners, and block in
//! the event loop until Escape is pressed.

pub mod dispatch;
pub mod errors;
pub mod keycode;
pub mod session;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

use dispatch::EventType;
use errors::StderrErrorHandler;
use session::Session;
pub use session::WindowConfig;

/// Session setup errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot open display: {0}")]
    Connect(#[from] ConnectError),
    #[error("X11 connection: {0}")]
    Connection(#[from] ConnectionError),
    #[error("X11 request failed: {0}")]
    Reply(#[from] ReplyError),
    #[error("X11 resource id: {0}")]
    Id(#[from] ReplyOrIdError),
}

/// Run the launcher window until Escape is pressed.
pub fn run(display: Option<&str>, title: &str, config: WindowConfig) -> Result<(), SessionError> {
    let mut session = Session::open(display, title, config, Box::new(StderrErrorHandler))?;

    session.register_listener(EventType::KeyPress, keycode::quit_on_escape);
    session.register_listener(EventType::Expose, keycode::trace_event);
    session.register_listener(EventType::ButtonPress, keycode::trace_event);

    tracing::info!(
        screen = session.screen_num(),
        window = session.window(),
        width = session.config().width,
        height = session.config().height,
        "launcher running, press Escape to quit"
    );

    session.run_loop();

    tracing::info!("launcher stopped");
    Ok(())
}
