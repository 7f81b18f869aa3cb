//! Animated glow-and-grain backgrounds.
//!
//! Two soft radial glows drift over true black, lean toward the pointer and
//! fuse through a bright bridge when they come close; a scrolling grain tile
//! sits on top. [`BackgroundRenderer`] paints frames into a `0x00RRGGBB`
//! [`FrameBuffer`]; a [`Mount`] binds it to a [`Host`] (a native window, a
//! browser canvas or the in-memory [`HeadlessHost`]) from mount to unmount.
//!
//! ```no_run
//! use glowfield::{HeadlessHost, Mount, RendererConfig, Viewport};
//!
//! let host = HeadlessHost::new(Viewport::new(1280.0, 720.0, 1.0));
//! let mut mount = Mount::new(host.clone(), RendererConfig::default()).unwrap();
//! host.advance(1.0 / 60.0);
//! mount.pump().unwrap();
//! assert_eq!(host.presented(), 1);
//! ```

pub mod blobs;
pub mod blur;
pub mod composite;
pub mod config;
pub mod cursor;
pub mod error;
pub mod grain;
pub mod headless;
pub mod host;
pub mod paint;
pub mod pointer;
pub mod renderer;
pub mod types;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

pub use blobs::{FrameLayout, Glow};
pub use config::{GlowMode, Palette, RendererConfig};
pub use cursor::CursorRing;
pub use error::Error;
pub use grain::GrainTexture;
pub use headless::HeadlessHost;
pub use host::{FrameRequest, Host, HostEvent, ListenerId, ListenerKind, Mount};
pub use pointer::PointerState;
pub use renderer::BackgroundRenderer;
pub use types::{FrameBuffer, Rgb};
pub use viewport::{Viewport, ViewportSurface};
#[cfg(not(target_arch = "wasm32"))]
pub use window::WindowHost;
