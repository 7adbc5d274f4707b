use crate::tiles::source::MapType;

/// Toolkit-neutral input events a front end forwards to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer button went down at a window position
    PointerPressed { x: i32, y: i32 },
    /// Pointer moved with the button held
    PointerDragged { x: i32, y: i32 },
    /// Pointer button released
    PointerReleased,
    ZoomIn,
    ZoomOut,
    SelectMapType(MapType),
}

impl InputEvent {
    /// Gets the position associated with this event, if any
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            InputEvent::PointerPressed { x, y } | InputEvent::PointerDragged { x, y } => {
                Some((*x, *y))
            }
            _ => None,
        }
    }

    /// Checks if handling this event fetches a new composite
    pub fn triggers_fetch(&self) -> bool {
        matches!(
            self,
            InputEvent::ZoomIn | InputEvent::ZoomOut | InputEvent::SelectMapType(_)
        )
    }
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// Notifications emitted after the viewport changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    /// The window moved; carries the new offset
    Panned { offset: (u32, u32) },
    /// A new composite was fetched
    Refetched { zoom: u8, map_type: MapType },
}

impl ViewEvent {
    /// Listener key for this event
    pub fn kind(&self) -> &'static str {
        match self {
            ViewEvent::Panned { .. } => "panned",
            ViewEvent::Refetched { .. } => "refetched",
        }
    }
}
