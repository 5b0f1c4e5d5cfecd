//! Tokens and the two capabilities the engine needs from them
//!
//! The scheduler only moves tokens and hides their labels; the judge only
//! reveals labels. Each side is generic over the trait it needs.

use std::fmt;

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::platform::TokenHandle;

/// Token identity, 1-based and stable for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Identified {
    fn id(&self) -> TokenId;
}

/// Something the scheduler can move
pub trait Positionable: Identified {
    fn position(&self) -> UVec2;
    fn set_position(&mut self, pos: UVec2);
}

/// Something whose label can be shown or hidden
pub trait Revealable: Identified {
    fn is_revealed(&self) -> bool;
    fn reveal(&mut self);
    fn obscure(&mut self);
}

/// A selectable button with a label to remember
#[derive(Debug)]
pub struct Token<H> {
    id: TokenId,
    label: String,
    color: String,
    position: UVec2,
    revealed: bool,
    handle: H,
}

impl<H: TokenHandle> Token<H> {
    /// New tokens start at the origin with their label showing
    pub fn new(id: TokenId, label: impl Into<String>, color: impl Into<String>, handle: H) -> Self {
        Self {
            id,
            label: label.into(),
            color: color.into(),
            position: UVec2::ZERO,
            revealed: true,
            handle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Remove the token from its surface
    pub fn destroy(self) {
        self.handle.destroy();
    }
}

impl<H> Identified for Token<H> {
    fn id(&self) -> TokenId {
        self.id
    }
}

impl<H: TokenHandle> Positionable for Token<H> {
    fn position(&self) -> UVec2 {
        self.position
    }

    fn set_position(&mut self, pos: UVec2) {
        self.position = pos;
        self.handle.set_position(pos);
    }
}

impl<H: TokenHandle> Revealable for Token<H> {
    fn is_revealed(&self) -> bool {
        self.revealed
    }

    // Always forwarded, even when already visible: a full reveal repaints every label
    fn reveal(&mut self) {
        self.revealed = true;
        self.handle.show_label();
    }

    fn obscure(&mut self) {
        self.revealed = false;
        self.handle.hide_label();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, PlatformEvent, TokenSurface, Viewport};

    #[test]
    fn test_token_forwards_to_handle() {
        let mut platform = HeadlessPlatform::new(40, Viewport::new(200, 200));
        let handle = platform.create_token(TokenId(2), "2", "#33FF57");
        let mut token = Token::new(TokenId(2), "2", "#33FF57", handle);
        assert!(token.is_revealed());
        assert_eq!(token.position(), UVec2::ZERO);

        token.set_position(UVec2::new(5, 7));
        token.obscure();
        assert!(!token.is_revealed());
        token.reveal();
        assert!(token.is_revealed());

        let events = platform.drain_events();
        assert_eq!(
            &events[1..],
            &[
                PlatformEvent::Moved { id: TokenId(2), pos: UVec2::new(5, 7) },
                PlatformEvent::LabelHidden { id: TokenId(2) },
                PlatformEvent::LabelShown { id: TokenId(2) },
            ]
        );
        assert_eq!(token.position(), UVec2::new(5, 7));
        assert_eq!(token.label(), "2");
        assert_eq!(token.color(), "#33FF57");
    }

    #[test]
    fn test_token_id_display() {
        assert_eq!(TokenId(7).to_string(), "7");
    }
}
