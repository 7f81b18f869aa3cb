#![cfg(target_arch = "wasm32")]
// Browser host: the background painted into a fixed, full-viewport <canvas>.
// Visual: the glow field sits behind the page and never catches clicks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use glam::Vec2;
use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, ImageData, MouseEvent, Window};

use crate::config::{Palette, RendererConfig};
use crate::error::Error;
use crate::host::{FrameRequest, Host, HostEvent, ListenerId, ListenerKind, Mount};
use crate::types::FrameBuffer;
use crate::viewport::Viewport;

type FrameCallback = Closure<dyn FnMut(f64)>;
type EventCallback = Closure<dyn FnMut(Event)>;
type MountSlot = RefCell<Option<Mount<WebHost>>>;

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn report(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

fn read_viewport(window: &Window) -> Viewport {
    let size = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    Viewport::new(
        size(window.inner_width()),
        size(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

/// Written by browser callbacks, drained by the mount on the next frame.
#[derive(Default)]
struct Inbox {
    events: VecDeque<HostEvent>,
    scheduled: Option<FrameRequest>,
    fired: Option<(FrameRequest, f64)>,
}

struct WebHost {
    window: Window,
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
    inbox: Rc<RefCell<Inbox>>,
    on_frame: FrameCallback,
    raf_handle: Option<(FrameRequest, i32)>,
    listeners: Vec<(ListenerId, ListenerKind, EventCallback)>,
    next_id: u64,
    rgba: Vec<u8>,
}

impl WebHost {
    fn event_name(kind: ListenerKind) -> &'static str {
        match kind {
            ListenerKind::Resize => "resize",
            ListenerKind::PointerMove => "mousemove",
        }
    }

    fn listener(&self, kind: ListenerKind) -> EventCallback {
        let inbox = Rc::clone(&self.inbox);
        match kind {
            ListenerKind::Resize => {
                let window = self.window.clone();
                Closure::wrap(Box::new(move |_event: Event| {
                    let viewport = read_viewport(&window);
                    inbox.borrow_mut().events.push_back(HostEvent::Resize(viewport));
                }) as Box<dyn FnMut(Event)>)
            }
            ListenerKind::PointerMove => Closure::wrap(Box::new(move |event: Event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let client = Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32);
                    inbox.borrow_mut().events.push_back(HostEvent::PointerMove(client));
                }
            }) as Box<dyn FnMut(Event)>),
        }
    }
}

impl Host for WebHost {
    fn viewport(&self) -> Viewport {
        read_viewport(&self.window)
    }

    fn acquire_surface(&mut self) -> bool {
        self.context.is_some()
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        let Some(context) = &self.context else {
            return Ok(());
        };
        let (w, h) = (frame.width as u32, frame.height as u32);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }

        self.rgba.clear();
        self.rgba.reserve(frame.pixels.len() * 4);
        for &p in &frame.pixels {
            self.rgba
                .extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8, 0xFF]);
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&self.rgba), w, h)
            .map_err(|e| Error::Present(format!("{e:?}")))?;
        context
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|e| Error::Present(format!("{e:?}")))
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        let callback = self.listener(kind);
        if let Err(e) = self
            .window
            .add_event_listener_with_callback(Self::event_name(kind), callback.as_ref().unchecked_ref())
        {
            report(&format!("addEventListener failed: {e:?}"));
        }
        self.listeners.push((id, kind, callback));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let Some(index) = self.listeners.iter().position(|(l, _, _)| *l == id) else {
            return;
        };
        let (_, kind, callback) = self.listeners.swap_remove(index);
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback(Self::event_name(kind), callback.as_ref().unchecked_ref())
        {
            report(&format!("removeEventListener failed: {e:?}"));
        }
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        match self.window.request_animation_frame(self.on_frame.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.raf_handle = Some((request, handle));
                self.inbox.borrow_mut().scheduled = Some(request);
            }
            Err(e) => report(&format!("requestAnimationFrame failed: {e:?}")),
        }
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Some((pending, handle)) = self.raf_handle {
            if pending == request {
                if let Err(e) = self.window.cancel_animation_frame(handle) {
                    report(&format!("cancelAnimationFrame failed: {e:?}"));
                }
                self.raf_handle = None;
            }
        }
        let mut inbox = self.inbox.borrow_mut();
        if inbox.scheduled == Some(request) {
            inbox.scheduled = None;
        }
        if matches!(inbox.fired, Some((fired, _)) if fired == request) {
            inbox.fired = None;
        }
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        self.inbox.borrow_mut().events.pop_front()
    }

    fn take_frame(&mut self, request: FrameRequest) -> Option<f64> {
        let mut inbox = self.inbox.borrow_mut();
        match inbox.fired {
            Some((fired, at)) if fired == request => {
                inbox.fired = None;
                self.raf_handle = None;
                Some(at)
            }
            _ => None,
        }
    }
}

/// The requestAnimationFrame callback: mark the frame fired, then pump.
fn frame_callback(slot: Weak<MountSlot>, inbox: Rc<RefCell<Inbox>>) -> FrameCallback {
    Closure::wrap(Box::new(move |timestamp_ms: f64| {
        {
            let mut inbox = inbox.borrow_mut();
            if let Some(request) = inbox.scheduled.take() {
                inbox.fired = Some((request, timestamp_ms / 1000.0));
            }
        }
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let mut mount = slot.borrow_mut();
        if let Some(mount) = mount.as_mut() {
            if let Err(err) = mount.pump() {
                report(&format!("background frame failed: {err}"));
            }
        }
    }) as Box<dyn FnMut(f64)>)
}

/// Fixed, full-viewport, behind the content, transparent to the pointer.
fn style_canvas(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let style = canvas.style();
    for (name, value) in [
        ("position", "fixed"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("z-index", "0"),
        ("pointer-events", "none"),
        ("display", "block"),
    ] {
        style.set_property(name, value)?;
    }
    Ok(())
}

/// Look up and style the target canvas. Any failure leaves the page untouched
/// apart from what was already applied.
fn find_canvas(canvas_id: &str) -> Result<(Window, HtmlCanvasElement), String> {
    let window = web_sys::window().ok_or("window not available")?;
    let document = window.document().ok_or("document not available")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| format!("no element with id '{canvas_id}'"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| format!("element '{canvas_id}' is not a canvas"))?;
    style_canvas(&canvas).map_err(|e| format!("could not style the canvas: {e:?}"))?;
    Ok((window, canvas))
}

/// A background mounted onto a page canvas.
#[wasm_bindgen]
pub struct WebBackground {
    slot: Rc<MountSlot>,
}

#[wasm_bindgen]
impl WebBackground {
    /// Mount onto the canvas with id `canvas_id`. `palette` names a preset
    /// (`ocean`, `teal`, `slate`, `violet`, `amber`); an unknown name is the
    /// only error. A missing canvas or 2d context yields an inert background.
    /// Visual: the glow field appears behind the page on the next frame.
    pub fn mount(canvas_id: &str, palette: Option<String>) -> Result<WebBackground, JsValue> {
        let mut config = RendererConfig::default();
        if let Some(name) = palette {
            config.palette = Palette::preset(&name)
                .ok_or_else(|| JsValue::from_str(&format!("unknown palette: {name}")))?;
        }

        let slot: Rc<MountSlot> = Rc::new(RefCell::new(None));
        let (window, canvas) = match find_canvas(canvas_id) {
            Ok(found) => found,
            Err(reason) => {
                debug!("background stays inert: {reason}");
                return Ok(Self { slot });
            }
        };

        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());

        let inbox = Rc::new(RefCell::new(Inbox::default()));
        let host = WebHost {
            window,
            canvas,
            context,
            on_frame: frame_callback(Rc::downgrade(&slot), Rc::clone(&inbox)),
            inbox,
            raf_handle: None,
            listeners: Vec::new(),
            next_id: 0,
            rgba: Vec::new(),
        };
        let mount = Mount::new(host, config);
        *slot.borrow_mut() = mount;
        Ok(Self { slot })
    }

    /// False when mounting found nothing to draw into, or after `unmount`.
    pub fn is_mounted(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Stop the animation and detach every listener.
    /// Visual: the canvas keeps its last frame; nothing moves any more.
    pub fn unmount(&self) {
        let mount = self.slot.borrow_mut().take();
        drop(mount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn missing_canvas_is_inert_not_an_error() {
        let background = WebBackground::mount("no-such-canvas", None).unwrap();
        assert!(!background.is_mounted());
        background.unmount();
    }

    #[wasm_bindgen_test]
    fn non_canvas_element_is_inert() {
        let document = web_sys::window().unwrap().document().unwrap();
        let div = document.create_element("div").unwrap();
        div.set_id("glowfield-not-a-canvas");
        document.body().unwrap().append_child(&div).unwrap();

        let background = WebBackground::mount("glowfield-not-a-canvas", None).unwrap();
        assert!(!background.is_mounted());
    }

    #[wasm_bindgen_test]
    fn unknown_palette_is_rejected() {
        assert!(WebBackground::mount("no-such-canvas", Some("neon".into())).is_err());
    }

    #[wasm_bindgen_test]
    fn canvas_with_context_mounts_and_unmounts() {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document.create_element("canvas").unwrap();
        canvas.set_id("glowfield-canvas");
        document.body().unwrap().append_child(&canvas).unwrap();

        let background = WebBackground::mount("glowfield-canvas", Some("teal".into())).unwrap();
        assert!(background.is_mounted());
        background.unmount();
        assert!(!background.is_mounted());
    }
}
