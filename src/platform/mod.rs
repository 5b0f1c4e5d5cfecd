//! Platform abstraction layer
//!
//! The engine never touches the DOM directly. It talks to:
//! - a token surface (create, move, hide/show labels, destroy)
//! - a message sink (show text, clear text)
//! - a one-shot timer (schedule, cancel)

pub mod clock;
pub mod headless;

use std::time::Duration;

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{TickTicket, TokenId};

pub use clock::ManualClock;
pub use headless::{HeadlessPlatform, HeadlessToken, PlatformEvent};

/// Size of the area tokens are scattered in, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rendered form of one token
pub trait TokenHandle {
    fn set_position(&mut self, pos: UVec2);
    fn hide_label(&mut self);
    fn show_label(&mut self);
    /// Remove the token from the surface
    fn destroy(self);
}

/// Where tokens are drawn
pub trait TokenSurface {
    type Handle: TokenHandle;

    fn create_token(&mut self, id: TokenId, label: &str, color: &str) -> Self::Handle;

    /// Side length of a token's square footprint, measured from the rendered token
    fn footprint(&self) -> u32;

    /// Current bounds of the play area
    fn viewport(&self) -> Viewport;
}

/// Textual feedback for the player
pub trait MessageSink {
    fn notify(&mut self, text: &str);
    fn clear_notification(&mut self);
}

/// One-shot delayed callbacks, delivered back to the session as tickets
pub trait Timer {
    fn schedule(&mut self, delay: Duration, ticket: TickTicket);
    fn cancel(&mut self, ticket: TickTicket);
}

/// Everything a game session needs from its host
pub trait Platform: TokenSurface + MessageSink + Timer {}

impl<P: TokenSurface + MessageSink + Timer> Platform for P {}
