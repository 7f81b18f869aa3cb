// Native desktop host: a resizable minifb window showing the background.
// Visual: the glow field fills the window; an optional ring follows the mouse.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::debug;
use minifb::{Key, MouseMode, ScaleMode, Window, WindowOptions};

use crate::cursor::CursorRing;
use crate::error::Error;
use crate::host::{FrameRequest, Host, HostEvent, ListenerId, ListenerKind};
use crate::types::FrameBuffer;
use crate::viewport::Viewport;

/// Native host: one resizable minifb window showing the frame buffer.
pub struct WindowHost {
    window: Window, // the on-screen window you see
    viewport: Viewport,
    listeners: Vec<(ListenerId, ListenerKind)>,
    next_id: u64,
    pending: Option<FrameRequest>,
    events: VecDeque<HostEvent>,
    pointer: Option<Vec2>,
    cursor: Option<CursorRing>,
    canvas: FrameBuffer, // frame + cursor, only used when the ring is on
    started: Instant,
    fps_since: Instant,
    fps_frames: u32,
}

impl WindowHost {
    /// Open a window of `viewport`'s logical size. The buffer is in device px
    /// and minifb stretches it to the window.
    /// Visual: a black window; the first frame fills it with the glow field.
    pub fn new(title: &str, viewport: Viewport, fps: usize, cursor: bool) -> Result<Self, Error> {
        let options = WindowOptions {
            resize: true,
            scale_mode: ScaleMode::Stretch,
            ..WindowOptions::default()
        };
        let width = viewport.width.max(1.0) as usize;
        let height = viewport.height.max(1.0) as usize;
        let mut window =
            Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(fps);
        // The ring replaces the system pointer.
        window.set_cursor_visibility(!cursor);
        debug!("window {width}x{height} at {fps} fps");

        let now = Instant::now();
        Ok(Self {
            window,
            viewport,
            listeners: Vec::new(),
            next_id: 0,
            pending: None,
            events: VecDeque::new(),
            pointer: None,
            cursor: cursor.then(CursorRing::default),
            canvas: FrameBuffer::new(1, 1),
            started: now,
            fps_since: now,
            fps_frames: 0,
        })
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down.
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Keep the window responsive when no frame is due.
    /// Visual: the last frame stays on screen unchanged.
    pub fn idle(&mut self) {
        self.window.update();
        self.poll_input();
    }

    fn listening(&self, kind: ListenerKind) -> bool {
        self.listeners.iter().any(|(_, k)| *k == kind)
    }

    /// Turn window state changes into queued events.
    fn poll_input(&mut self) {
        let (w, h) = self.window.get_size();
        let (w, h) = (w.max(1) as f32, h.max(1) as f32);
        if w != self.viewport.width || h != self.viewport.height {
            self.viewport = Viewport::new(w, h, self.viewport.device_pixel_ratio);
            debug!("window resized to {w}x{h}");
            if self.listening(ListenerKind::Resize) {
                self.events.push_back(HostEvent::Resize(self.viewport));
            }
        }

        let pointer = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Vec2::new(x, y));
        if pointer != self.pointer {
            self.pointer = pointer;
            if let Some(ring) = &mut self.cursor {
                match pointer {
                    Some(p) => ring.moved(p),
                    None => ring.left(),
                }
            }
            if let Some(p) = pointer {
                if self.listening(ListenerKind::PointerMove) {
                    self.events.push_back(HostEvent::PointerMove(p));
                }
            }
        }
    }

    fn count_frame(&mut self) {
        self.fps_frames += 1;
        let elapsed = self.fps_since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.fps_frames as f32 / elapsed.as_secs_f32();
            debug!("FPS: {fps:.1}");
            self.fps_frames = 0;
            self.fps_since = Instant::now();
        }
    }
}

impl Host for WindowHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn acquire_surface(&mut self) -> bool {
        self.window.is_open()
    }

    /// Push the pixels for this frame to the screen.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        let shown = match &self.cursor {
            Some(ring) if ring.is_visible() => {
                self.canvas.clone_from(frame);
                ring.draw(&mut self.canvas, self.viewport.device_pixel_ratio);
                &self.canvas
            }
            _ => frame,
        };
        self.window
            .update_with_buffer(&shown.pixels, shown.width, shown.height)
            .map_err(|e| Error::Present(e.to_string()))?;
        self.poll_input();
        self.count_frame();
        Ok(())
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }

    /// minifb paces `update_with_buffer` to the target fps, so a requested
    /// frame is always due.
    fn take_frame(&mut self, request: FrameRequest) -> Option<f64> {
        if self.pending != Some(request) {
            return None;
        }
        self.pending = None;
        Some(self.started.elapsed().as_secs_f64())
    }
}
