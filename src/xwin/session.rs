//! Display/window session: one connection, one splash window.
//!
//! `Session::open` connects, creates and maps the window, and keeps the
//! error handler it was given for the lifetime of the event loop. The
//! connection closes when the session is dropped.

use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    AtomEnum, ConnectionExt as _, CreateWindowAux, EventMask, PropMode, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::SessionError;
use super::dispatch::{Dispatcher, EventType, Flow};
use super::errors::ErrorHandler;

x11rb::atom_manager! {
    /// Atoms interned once at startup.
    pub Atoms: AtomsCookie {
        _NET_WM_NAME,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_SPLASH,
        UTF8_STRING,
    }
}

/// Geometry of the session window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: u16,
    pub height: u16,
    /// Left at zero so the WM centers the splash window.
    pub x: i16,
    pub y: i16,
    pub border_width: u16,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            x: 0,
            y: 0,
            border_width: 1,
        }
    }
}

/// Events the session window subscribes to.
pub fn input_mask() -> EventMask {
    EventMask::EXPOSURE | EventMask::KEY_PRESS | EventMask::BUTTON_PRESS
}

/// Owner of the X11 connection and the single application window.
pub struct Session {
    conn: RustConnection,
    screen_num: usize,
    window: Window,
    config: WindowConfig,
    dispatcher: Dispatcher,
    errors: Box<dyn ErrorHandler>,
}

impl Session {
    /// Connect to `display` (or `$DISPLAY`) and map a titled splash window.
    ///
    /// Nothing is sent to the server if the connection cannot be opened.
    /// Window requests are unchecked: their errors arrive through the
    /// event stream and go to `errors.protocol_error`.
    pub fn open(
        display: Option<&str>,
        title: &str,
        config: WindowConfig,
        errors: Box<dyn ErrorHandler>,
    ) -> Result<Self, SessionError> {
        let (conn, screen_num) = RustConnection::connect(display)?;
        tracing::info!(screen = screen_num, "connected to X11 display");

        let atoms = Atoms::new(&conn)?.reply()?;

        let screen = &conn.setup().roots[screen_num];
        let window = conn.generate_id()?;

        let aux = CreateWindowAux::new()
            .background_pixel(screen.white_pixel)
            .border_pixel(screen.black_pixel)
            .event_mask(input_mask());

        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            screen.root,
            config.x,
            config.y,
            config.width,
            config.height,
            config.border_width,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &aux,
        )?;

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            title.as_bytes(),
        )?;
        conn.change_property8(
            PropMode::REPLACE,
            window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            title.as_bytes(),
        )?;

        // Undecorated, WM-placed.
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms._NET_WM_WINDOW_TYPE,
            AtomEnum::ATOM,
            &[atoms._NET_WM_WINDOW_TYPE_SPLASH],
        )?;

        conn.map_window(window)?;
        conn.flush()?;

        tracing::info!(
            window,
            width = config.width,
            height = config.height,
            border_width = config.border_width,
            title,
            "window mapped"
        );

        Ok(Self {
            conn,
            screen_num,
            window,
            config,
            dispatcher: Dispatcher::new(),
            errors,
        })
    }

    /// Append a listener for `event_type`.
    pub fn register_listener<F>(&mut self, event_type: EventType, listener: F)
    where
        F: FnMut(&Event) -> Flow + 'static,
    {
        self.dispatcher.register(event_type, listener);
    }

    /// Block on the connection and dispatch events until a listener quits.
    pub fn run_loop(&mut self) {
        tracing::debug!(window = self.window, "entering event loop");
        self.dispatcher.run(&mut self.conn, &*self.errors);
        tracing::debug!(window = self.window, "event loop finished");
    }

    #[cfg(test)]
    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    pub fn screen_num(&self) -> usize {
        self.screen_num
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(window = self.window, "closing X11 connection");
    }
}
