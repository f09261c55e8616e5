use iced::{Point, Size};
use std::fmt;
use std::path::PathBuf;

/// Notifications emitted by the image display
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// An image was set; carries the path it was loaded from
    ImageAdded(PathBuf),
    /// A rubber band was released; carries (anchor, release point)
    RectangleCaptured(Point, Point),
    /// The user right-clicked the display
    ClearSelection,
    /// The viewport changed size
    Resized(Size),
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&DisplayEvent)>;

/// Synchronous observer list. Listeners run on the emitting thread,
/// in the order they subscribed.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DisplayEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: DisplayEvent) {
        tracing::trace!(?event, listeners = self.listeners.len(), "emit");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
