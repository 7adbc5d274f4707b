use std::collections::{HashMap, VecDeque};

use crate::{
    core::constants::{MAX_VIEWPORT_ZOOM, MIN_VIEWPORT_ZOOM},
    core::viewport::Viewport,
    input::events::{EventHandled, InputEvent, ViewEvent},
    Result,
};

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&ViewEvent) + Send + Sync>;

/// Event management system for the viewport
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event kind
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<ViewEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener for `kind` (see [`ViewEvent::kind`])
    pub fn on<F>(&mut self, kind: &str, callback: F)
    where
        F: Fn(&ViewEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(kind.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: ViewEvent) {
        self.event_queue.push_back(event);
    }

    /// Dispatch all queued events to their listeners
    pub fn process_events(&mut self) -> Vec<ViewEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(listeners) = self.listeners.get(event.kind()) {
                for listener in listeners {
                    listener(event);
                }
            }
        }

        events
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.get(kind).map(Vec::len).unwrap_or(0)
    }
}

/// Translates pointer, zoom and style events into viewport calls.
#[derive(Default)]
pub struct InputHandler {
    drag_anchor: Option<(i32, i32)>,
    events: EventManager,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for viewport notifications
    pub fn on<F>(&mut self, kind: &str, callback: F)
    where
        F: Fn(&ViewEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, callback);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn handle(&mut self, viewport: &mut Viewport, event: InputEvent) -> Result<EventHandled> {
        let handled = match event {
            InputEvent::PointerPressed { x, y } => {
                self.drag_anchor = Some((x, y));
                EventHandled::Handled
            }
            InputEvent::PointerDragged { x, y } => match self.drag_anchor {
                Some((ax, ay)) => {
                    // dragging the map right moves the window left
                    viewport.pan(ax - x, ay - y);
                    self.drag_anchor = Some((x, y));
                    self.events.emit(ViewEvent::Panned {
                        offset: viewport.offset(),
                    });
                    EventHandled::Handled
                }
                None => EventHandled::NotHandled,
            },
            InputEvent::PointerReleased => match self.drag_anchor.take() {
                Some(_) => EventHandled::Handled,
                None => EventHandled::NotHandled,
            },
            InputEvent::ZoomIn => self.zoom_by(viewport, 1)?,
            InputEvent::ZoomOut => self.zoom_by(viewport, -1)?,
            InputEvent::SelectMapType(map_type) => {
                viewport.set_map_type(map_type)?;
                self.emit_refetched(viewport);
                EventHandled::Handled
            }
        };

        self.events.process_events();
        Ok(handled)
    }

    fn zoom_by(&mut self, viewport: &mut Viewport, step: i16) -> Result<EventHandled> {
        let level = viewport.zoom() as i16 + step;
        if level < MIN_VIEWPORT_ZOOM as i16 || level > MAX_VIEWPORT_ZOOM as i16 {
            return Ok(EventHandled::NotHandled);
        }
        viewport.set_zoom(level as u8)?;
        self.emit_refetched(viewport);
        Ok(EventHandled::Handled)
    }

    fn emit_refetched(&mut self, viewport: &Viewport) {
        self.events.emit(ViewEvent::Refetched {
            zoom: viewport.zoom(),
            map_type: viewport.map_type(),
        });
    }
}
