//! Event dispatch table: event type → ordered listener list.
//!
//! The loop blocks on an `EventSource`, hands protocol errors to the
//! session's `ErrorHandler`, and runs every listener registered for the
//! event's type. Quit is checked only after the whole batch has run.

use std::collections::HashMap;

use x11rb::connection::Connection;
use x11rb::errors::ConnectionError;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use super::errors::ErrorHandler;

/// Core event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    MotionNotify,
    Expose,
    FocusIn,
    FocusOut,
    MapNotify,
    UnmapNotify,
    ConfigureNotify,
    ClientMessage,
}

impl EventType {
    /// Classify an event, or `None` for errors and kinds nobody can
    /// subscribe to.
    pub fn of(event: &Event) -> Option<Self> {
        let ty = match event {
            Event::KeyPress(_) => Self::KeyPress,
            Event::KeyRelease(_) => Self::KeyRelease,
            Event::ButtonPress(_) => Self::ButtonPress,
            Event::ButtonRelease(_) => Self::ButtonRelease,
            Event::MotionNotify(_) => Self::MotionNotify,
            Event::Expose(_) => Self::Expose,
            Event::FocusIn(_) => Self::FocusIn,
            Event::FocusOut(_) => Self::FocusOut,
            Event::MapNotify(_) => Self::MapNotify,
            Event::UnmapNotify(_) => Self::UnmapNotify,
            Event::ConfigureNotify(_) => Self::ConfigureNotify,
            Event::ClientMessage(_) => Self::ClientMessage,
            _ => return None,
        };
        Some(ty)
    }
}

/// Result of a single listener invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A registered event callback.
pub type Listener = Box<dyn FnMut(&Event) -> Flow>;

/// Blocking source of X11 events.
///
/// `RustConnection` is the production source; tests feed canned events.
pub trait EventSource {
    /// Block until the next event (or protocol error) arrives.
    fn next_event(&mut self) -> Result<Event, ConnectionError>;
}

impl EventSource for RustConnection {
    fn next_event(&mut self) -> Result<Event, ConnectionError> {
        self.wait_for_event()
    }
}

/// Mapping from event type to listeners, in registration order.
#[derive(Default)]
pub struct Dispatcher {
    listeners: HashMap<EventType, Vec<Listener>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for `event_type`. No deduplication.
    pub fn register<F>(&mut self, event_type: EventType, listener: F)
    where
        F: FnMut(&Event) -> Flow + 'static,
    {
        self.listeners
            .entry(event_type)
            .or_default()
            .push(Box::new(listener));
    }

    /// Number of listeners registered for `event_type`.
    #[allow(dead_code)]
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }

    /// Run every listener for the event's type.
    ///
    /// All listeners run even after one returns `Flow::Quit`; the
    /// aggregate result is `Quit` if any of them did.
    pub fn dispatch(&mut self, event: &Event) -> Flow {
        let Some(event_type) = EventType::of(event) else {
            return Flow::Continue;
        };
        let Some(listeners) = self.listeners.get_mut(&event_type) else {
            tracing::trace!(?event_type, "no listeners");
            return Flow::Continue;
        };

        let mut flow = Flow::Continue;
        for listener in listeners.iter_mut() {
            if listener(event) == Flow::Quit {
                flow = Flow::Quit;
            }
        }
        flow
    }

    /// Pump events from `source` until a batch returns `Flow::Quit`.
    ///
    /// Protocol errors are reported and skipped. A connection error is
    /// handed to `errors.io_error`, which does not return.
    pub fn run<S>(&mut self, source: &mut S, errors: &dyn ErrorHandler)
    where
        S: EventSource + ?Sized,
    {
        loop {
            let event = match source.next_event() {
                Ok(event) => event,
                Err(e) => errors.io_error(&e),
            };

            if let Event::Error(e) = &event {
                errors.protocol_error(e);
                continue;
            }

            if self.dispatch(&event) == Flow::Quit {
                tracing::debug!("listener requested quit");
                return;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use x11rb::protocol::xproto::{ButtonPressEvent, ExposeEvent, KeyPressEvent};
    use x11rb::protocol::{ErrorKind, Event};
    use x11rb::x11_utils::X11Error;

    use super::*;

    /// Canned event source. Panics when drained so a loop that fails to
    /// stop is caught instead of hanging.
    pub(crate) struct ScriptedSource {
        events: VecDeque<Result<Event, ConnectionError>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(events: Vec<Event>) -> Self {
            Self {
                events: events.into_iter().map(Ok).collect(),
            }
        }

        pub(crate) fn then_fail(mut self, error: ConnectionError) -> Self {
            self.events.push_back(Err(error));
            self
        }

        pub(crate) fn remaining(&self) -> usize {
            self.events.len()
        }
    }

    impl EventSource for ScriptedSource {
        fn next_event(&mut self) -> Result<Event, ConnectionError> {
            self.events
                .pop_front()
                .expect("event loop kept running after the script ran out")
        }
    }

    /// Records protocol errors; panics on I/O errors.
    #[derive(Default)]
    pub(crate) struct RecordingHandler {
        pub(crate) protocol_errors: RefCell<Vec<u8>>,
    }

    impl ErrorHandler for RecordingHandler {
        fn protocol_error(&self, error: &X11Error) {
            self.protocol_errors.borrow_mut().push(error.error_code);
        }

        fn io_error(&self, error: &ConnectionError) -> ! {
            panic!("fatal io error: {error}");
        }
    }

    pub(crate) fn key_press(keycode: u8) -> Event {
        Event::KeyPress(KeyPressEvent {
            response_type: 2,
            detail: keycode,
            sequence: 0,
            time: 0,
            root: 0,
            event: 0,
            child: 0,
            root_x: 0,
            root_y: 0,
            event_x: 0,
            event_y: 0,
            state: 0u16.into(),
            same_screen: true,
        })
    }

    pub(crate) fn button_press(button: u8) -> Event {
        Event::ButtonPress(ButtonPressEvent {
            response_type: 4,
            detail: button,
            sequence: 0,
            time: 0,
            root: 0,
            event: 0,
            child: 0,
            root_x: 10,
            root_y: 20,
            event_x: 10,
            event_y: 20,
            state: 0u16.into(),
            same_screen: true,
        })
    }

    pub(crate) fn expose() -> Event {
        Event::Expose(ExposeEvent {
            response_type: 12,
            sequence: 0,
            window: 0,
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            count: 0,
        })
    }

    pub(crate) fn bad_window_error() -> Event {
        Event::Error(X11Error {
            error_kind: ErrorKind::Window,
            error_code: 3,
            sequence: 7,
            bad_value: 0x0040_0001,
            minor_opcode: 0,
            major_opcode: 18,
            extension_name: None,
            request_name: Some("ChangeProperty"),
        })
    }

    #[test]
    fn classifies_subscribed_event_types() {
        assert_eq!(EventType::of(&key_press(9)), Some(EventType::KeyPress));
        assert_eq!(EventType::of(&button_press(1)), Some(EventType::ButtonPress));
        assert_eq!(EventType::of(&expose()), Some(EventType::Expose));
        assert_eq!(EventType::of(&bad_window_error()), None);
    }

    #[test]
    fn listeners_run_once_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        for id in 0..4 {
            let calls = Rc::clone(&calls);
            dispatcher.register(EventType::KeyPress, move |_| {
                calls.borrow_mut().push(id);
                Flow::Continue
            });
        }

        assert_eq!(dispatcher.listener_count(EventType::KeyPress), 4);
        assert_eq!(dispatcher.dispatch(&key_press(38)), Flow::Continue);
        assert_eq!(*calls.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duplicate_listeners_are_kept() {
        let hits = Rc::new(RefCell::new(0));
        let mut dispatcher = Dispatcher::new();

        fn counter(hits: &Rc<RefCell<u32>>) -> impl FnMut(&Event) -> Flow + 'static {
            let hits = Rc::clone(hits);
            move |_| {
                *hits.borrow_mut() += 1;
                Flow::Continue
            }
        }

        dispatcher.register(EventType::Expose, counter(&hits));
        dispatcher.register(EventType::Expose, counter(&hits));
        dispatcher.dispatch(&expose());
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn quit_waits_for_rest_of_batch() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        let first = Rc::clone(&calls);
        dispatcher.register(EventType::KeyPress, move |_| {
            first.borrow_mut().push("quit");
            Flow::Quit
        });
        let second = Rc::clone(&calls);
        dispatcher.register(EventType::KeyPress, move |_| {
            second.borrow_mut().push("after");
            Flow::Continue
        });

        assert_eq!(dispatcher.dispatch(&key_press(9)), Flow::Quit);
        assert_eq!(*calls.borrow(), vec!["quit", "after"]);
    }

    #[test]
    fn event_without_listeners_is_noop() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(EventType::KeyPress, |_| Flow::Quit);

        assert_eq!(dispatcher.listener_count(EventType::ButtonPress), 0);
        assert_eq!(dispatcher.dispatch(&button_press(1)), Flow::Continue);
    }

    #[test]
    fn run_stops_after_quitting_batch() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(EventType::KeyPress, |event| match event {
            Event::KeyPress(e) if e.detail == 9 => Flow::Quit,
            _ => Flow::Continue,
        });

        let mut source = ScriptedSource::new(vec![
            expose(),
            button_press(1),
            key_press(38),
            key_press(9),
            key_press(38),
        ]);
        let handler = RecordingHandler::default();

        dispatcher.run(&mut source, &handler);

        // The trailing key press is never read.
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn run_survives_protocol_errors() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(EventType::KeyPress, |_| Flow::Quit);

        let mut source = ScriptedSource::new(vec![bad_window_error(), key_press(9)]);
        let handler = RecordingHandler::default();

        dispatcher.run(&mut source, &handler);

        assert_eq!(*handler.protocol_errors.borrow(), vec![3]);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "fatal io error")]
    fn run_hands_connection_errors_to_io_handler() {
        let mut dispatcher = Dispatcher::new();
        let mut source =
            ScriptedSource::new(vec![expose()]).then_fail(ConnectionError::UnknownError);

        dispatcher.run(&mut source, &RecordingHandler::default());
    }
}
