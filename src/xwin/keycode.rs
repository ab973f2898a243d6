//! Stock listeners: Escape-to-quit and debug tracing.

use x11rb::protocol::Event;
use x11rb::protocol::xproto::Keycode;

use super::dispatch::Flow;

/// Escape on the standard evdev/XFree86 keymap.
pub const ESCAPE_KEYCODE: Keycode = 0x09;

/// `Flow::Quit` for an Escape key press, `Flow::Continue` otherwise.
pub fn quit_on_escape(event: &Event) -> Flow {
    match event {
        Event::KeyPress(e) if e.detail == ESCAPE_KEYCODE => {
            tracing::info!(keycode = e.detail, "escape pressed");
            Flow::Quit
        }
        _ => Flow::Continue,
    }
}

/// Log the event at debug level. Never quits.
pub fn trace_event(event: &Event) -> Flow {
    match event {
        Event::Expose(e) => tracing::debug!(
            window = e.window,
            x = e.x,
            y = e.y,
            width = e.width,
            height = e.height,
            count = e.count,
            "expose"
        ),
        Event::ButtonPress(e) => tracing::debug!(
            button = e.detail,
            x = e.event_x,
            y = e.event_y,
            "button press"
        ),
        Event::KeyPress(e) => tracing::debug!(keycode = e.detail, "key press"),
        other => tracing::trace!(event = ?other, "event"),
    }
    Flow::Continue
}
