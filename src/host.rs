// The environment a background is mounted into, and the mount lifecycle.
// A host owns the surface, the event listeners and the frame scheduler;
// the mount drives one renderer against one host until it is torn down.

use glam::Vec2;
use log::debug;

use crate::config::RendererConfig;
use crate::error::Error;
use crate::renderer::BackgroundRenderer;
use crate::types::FrameBuffer;
use crate::viewport::Viewport;

/// Handle for a scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Handle for a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Resize,
    PointerMove,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// The viewport changed size or density.
    Resize(Viewport),
    /// Pointer position in logical client px.
    PointerMove(Vec2),
}

impl HostEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            HostEvent::Resize(_) => ListenerKind::Resize,
            HostEvent::PointerMove(_) => ListenerKind::PointerMove,
        }
    }
}

/// What a mount needs from its environment.
///
/// Hosts only queue events for kinds that currently have a listener, and a
/// frame request fires at most once.
pub trait Host {
    fn viewport(&self) -> Viewport;

    /// Obtain the drawing surface; false means there is nothing to draw into.
    fn acquire_surface(&mut self) -> bool;

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);

    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Next queued event, if any.
    fn poll_event(&mut self) -> Option<HostEvent>;

    /// Timestamp in seconds if `request` has fired; consumes it.
    fn take_frame(&mut self, request: FrameRequest) -> Option<f64>;
}

/// One mounted background: a renderer bound to a host from mount to unmount.
pub struct Mount<H: Host> {
    host: H,
    renderer: BackgroundRenderer,
    listeners: Vec<ListenerId>,
    pending: Option<FrameRequest>,
    started_at: Option<f64>,
}

impl<H: Host> Mount<H> {
    /// Mount onto `host`. Without a surface this is a silent no-op: nothing is
    /// registered and `None` comes back.
    pub fn new(mut host: H, config: RendererConfig) -> Option<Self> {
        if !host.acquire_surface() {
            debug!("no drawing surface; background stays inert");
            return None;
        }
        let renderer = BackgroundRenderer::new(config, host.viewport());
        let listeners = vec![
            host.add_listener(ListenerKind::Resize),
            host.add_listener(ListenerKind::PointerMove),
        ];
        let pending = Some(host.request_frame());
        debug!("background mounted");
        Some(Self {
            host,
            renderer,
            listeners,
            pending,
            started_at: None,
        })
    }

    /// Apply queued events, then paint and present if the pending frame is
    /// due. Returns whether a frame was painted.
    /// Visual: at most one new frame on screen per call.
    pub fn pump(&mut self) -> Result<bool, Error> {
        let Some(request) = self.pending else {
            return Ok(false);
        };
        while let Some(event) = self.host.poll_event() {
            match event {
                HostEvent::Resize(viewport) => self.renderer.resize(viewport),
                HostEvent::PointerMove(client) => self.renderer.pointer_moved(client),
            }
        }

        let Some(timestamp) = self.host.take_frame(request) else {
            return Ok(false);
        };
        self.pending = None;
        let start = *self.started_at.get_or_insert(timestamp);
        let t = (timestamp - start).max(0.0) as f32;

        let frame = self.renderer.paint_frame(t)?;
        self.host.present(frame)?;
        self.pending = Some(self.host.request_frame());
        Ok(true)
    }

    /// Cancel the pending frame and drop both listeners. Safe to call twice;
    /// dropping the mount does the same.
    /// Visual: the animation freezes on its last frame.
    pub fn unmount(&mut self) {
        let was_mounted = self.is_mounted();
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        if was_mounted {
            debug!("background unmounted after {} frames", self.renderer.frames());
        }
    }

    /// Still scheduling frames or listening for events.
    pub fn is_mounted(&self) -> bool {
        self.pending.is_some() || !self.listeners.is_empty()
    }

    /// The renderer driving this mount.
    pub fn renderer(&self) -> &BackgroundRenderer {
        &self.renderer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Drop for Mount<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
