//! Headless platform that records every call
//!
//! Drives the native front end and the tests. Token handles share the
//! event log with the platform so the full call order can be inspected.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::UVec2;

use super::{ManualClock, MessageSink, Timer, TokenHandle, TokenSurface, Viewport};
use crate::sim::{TickTicket, TokenId};

/// One observable platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Created { id: TokenId, label: String, color: String },
    Moved { id: TokenId, pos: UVec2 },
    LabelHidden { id: TokenId },
    LabelShown { id: TokenId },
    Destroyed { id: TokenId },
    Notified(String),
    NotificationCleared,
}

type EventLog = Rc<RefCell<Vec<PlatformEvent>>>;

/// A token that only exists in the event log
#[derive(Debug)]
pub struct HeadlessToken {
    id: TokenId,
    log: EventLog,
}

impl TokenHandle for HeadlessToken {
    fn set_position(&mut self, pos: UVec2) {
        self.log.borrow_mut().push(PlatformEvent::Moved { id: self.id, pos });
    }

    fn hide_label(&mut self) {
        self.log.borrow_mut().push(PlatformEvent::LabelHidden { id: self.id });
    }

    fn show_label(&mut self) {
        self.log.borrow_mut().push(PlatformEvent::LabelShown { id: self.id });
    }

    fn destroy(self) {
        self.log.borrow_mut().push(PlatformEvent::Destroyed { id: self.id });
    }
}

/// In-memory surface, message sink and logical timer
#[derive(Debug)]
pub struct HeadlessPlatform {
    footprint: u32,
    viewport: Viewport,
    log: EventLog,
    clock: ManualClock,
    /// Text currently on screen
    message: Option<String>,
}

impl HeadlessPlatform {
    pub fn new(footprint: u32, viewport: Viewport) -> Self {
        Self {
            footprint,
            viewport,
            log: Rc::new(RefCell::new(Vec::new())),
            clock: ManualClock::new(),
            message: None,
        }
    }

    /// Simulate a window resize
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut ManualClock {
        &mut self.clock
    }

    /// Snapshot of every recorded call so far
    pub fn events(&self) -> Vec<PlatformEvent> {
        self.log.borrow().clone()
    }

    /// Recorded calls since the log was last drained
    pub fn drain_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Last message shown, `None` if cleared or never set
    pub fn message(&self) -> Option<String> {
        self.message.clone()
    }
}

impl TokenSurface for HeadlessPlatform {
    type Handle = HeadlessToken;

    fn create_token(&mut self, id: TokenId, label: &str, color: &str) -> HeadlessToken {
        self.log.borrow_mut().push(PlatformEvent::Created {
            id,
            label: label.to_string(),
            color: color.to_string(),
        });
        HeadlessToken {
            id,
            log: Rc::clone(&self.log),
        }
    }

    fn footprint(&self) -> u32 {
        self.footprint
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl MessageSink for HeadlessPlatform {
    fn notify(&mut self, text: &str) {
        self.message = Some(text.to_string());
        self.log.borrow_mut().push(PlatformEvent::Notified(text.to_string()));
    }

    fn clear_notification(&mut self) {
        self.message = None;
        self.log.borrow_mut().push(PlatformEvent::NotificationCleared);
    }
}

impl Timer for HeadlessPlatform {
    fn schedule(&mut self, delay: Duration, ticket: TickTicket) {
        self.clock.schedule(delay, ticket);
    }

    fn cancel(&mut self, ticket: TickTicket) {
        self.clock.cancel(ticket);
    }
}
