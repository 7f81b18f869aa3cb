// An in-memory host: a simulated clock, event queue and frame scheduler.
// Used by tests and by the CLI's snapshot mode.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;

use crate::error::Error;
use crate::host::{FrameRequest, Host, HostEvent, ListenerId, ListenerKind};
use crate::types::FrameBuffer;
use crate::viewport::Viewport;

struct HeadlessState {
    viewport: Viewport,
    has_surface: bool,
    clock: f64,
    next_id: u64,
    listeners: Vec<(ListenerId, ListenerKind)>,
    pending: Option<FrameRequest>,
    due: Option<(FrameRequest, f64)>,
    events: VecDeque<HostEvent>,
    presented: usize,
    last_frame: Option<FrameBuffer>,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cloneable handle; every clone sees the same state, so a test can keep one
/// while the mount owns another.
#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self::build(viewport, true)
    }

    /// A host whose surface can never be acquired.
    pub fn without_surface(viewport: Viewport) -> Self {
        Self::build(viewport, false)
    }

    fn build(viewport: Viewport, has_surface: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                viewport,
                has_surface,
                clock: 0.0,
                next_id: 0,
                listeners: Vec::new(),
                pending: None,
                due: None,
                events: VecDeque::new(),
                presented: 0,
                last_frame: None,
            })),
        }
    }

    /// Move the clock forward by `dt` seconds and fire the pending frame
    /// request, if there is one.
    pub fn advance(&self, dt: f64) -> bool {
        let mut state = self.state.borrow_mut();
        state.clock += dt;
        match state.pending.take() {
            Some(request) => {
                let now = state.clock;
                state.due = Some((request, now));
                true
            }
            None => false,
        }
    }

    /// Queue `event` for the mount. Returns false (and drops the event) when
    /// no listener of its kind is registered.
    pub fn dispatch(&self, event: HostEvent) -> bool {
        let mut state = self.state.borrow_mut();
        let kind = event.kind();
        if !state.listeners.iter().any(|(_, k)| *k == kind) {
            return false;
        }
        state.events.push_back(event);
        true
    }

    /// Change the viewport and notify resize listeners.
    pub fn resize(&self, viewport: Viewport) -> bool {
        self.state.borrow_mut().viewport = viewport;
        self.dispatch(HostEvent::Resize(viewport))
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> bool {
        self.dispatch(HostEvent::PointerMove(Vec2::new(x, y)))
    }

    /// Frames presented so far.
    pub fn presented(&self) -> usize {
        self.state.borrow().presented
    }

    pub fn last_frame(&self) -> Option<FrameBuffer> {
        self.state.borrow().last_frame.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn has_pending_frame(&self) -> bool {
        let state = self.state.borrow();
        state.pending.is_some() || state.due.is_some()
    }

    /// Simulated time in seconds.
    pub fn clock(&self) -> f64 {
        self.state.borrow().clock
    }
}

impl Host for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn acquire_surface(&mut self) -> bool {
        self.state.borrow().has_surface
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        state.presented += 1;
        match &mut state.last_frame {
            Some(last) => last.clone_from(frame),
            slot => *slot = Some(frame.clone()),
        }
        Ok(())
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id());
        state.listeners.push((id, kind));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|(l, _)| *l != id);
    }

    fn request_frame(&mut self) -> FrameRequest {
        let mut state = self.state.borrow_mut();
        let request = FrameRequest(state.next_id());
        state.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(request) {
            state.pending = None;
        }
        if matches!(state.due, Some((due, _)) if due == request) {
            state.due = None;
        }
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        self.state.borrow_mut().events.pop_front()
    }

    fn take_frame(&mut self, request: FrameRequest) -> Option<f64> {
        let mut state = self.state.borrow_mut();
        match state.due {
            Some((due, at)) if due == request => {
                state.due = None;
                Some(at)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_need_a_listener() {
        let mut host = HeadlessHost::new(Viewport::new(10.0, 10.0, 1.0));
        assert!(!host.pointer_move(1.0, 2.0));
        let id = host.add_listener(ListenerKind::PointerMove);
        assert!(host.pointer_move(1.0, 2.0));
        assert!(!host.resize(Viewport::new(20.0, 20.0, 1.0)));
        assert_eq!(host.viewport().width, 20.0);
        host.remove_listener(id);
        assert!(!host.pointer_move(3.0, 4.0));
        assert_eq!(host.poll_event(), Some(HostEvent::PointerMove(Vec2::new(1.0, 2.0))));
        assert_eq!(host.poll_event(), None);
    }

    #[test]
    fn frame_requests_fire_once() {
        let mut host = HeadlessHost::new(Viewport::new(10.0, 10.0, 1.0));
        assert!(!host.advance(0.1));
        let request = host.request_frame();
        assert_eq!(host.take_frame(request), None);
        assert!(host.advance(0.5));
        assert_eq!(host.take_frame(request), Some(0.6));
        assert_eq!(host.take_frame(request), None);
        assert!(!host.has_pending_frame());
    }

    #[test]
    fn cancelled_frames_never_fire() {
        let mut host = HeadlessHost::new(Viewport::new(10.0, 10.0, 1.0));
        let request = host.request_frame();
        host.cancel_frame(request);
        assert!(!host.has_pending_frame());
        assert!(!host.advance(1.0));
        assert_eq!(host.take_frame(request), None);
    }
}
