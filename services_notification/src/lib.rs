#![no_std]

//! # Notification + Status Service
//!
//! Provides the two modal dialogs (success, error) and the status output area
//! the compile loop reports into.
//!
//! ## Philosophy
//!
//! - **Best-effort**: A missing surface turns a notification into a no-op, never a fault
//! - **Independent modals**: Success and error dialogs have separate identities
//! - **Deterministic**: All notifications are timestamped and ordered
//! - **Testable**: Notification history and surface state can be inspected
//!
//! ## Example
//!
//! ```ignore
//! use services_notification::{ModalKind, NotificationController};
//!
//! let mut controller = NotificationController::new();
//!
//! controller.show_success("Compile successful!!!");
//! assert!(controller.is_visible(ModalKind::Success));
//!
//! controller.set_status("Compile failed");
//! controller.dismiss(ModalKind::Success);
//! ```

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of notifications to keep in history
const MAX_NOTIFICATION_HISTORY: usize = 100;

/// Unique identifier for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new notification ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notif:{}", self.0)
    }
}

/// Which modal dialog a notification targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModalKind {
    /// Success dialog
    Success,
    /// Error dialog
    Error,
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalKind::Success => write!(f, "SUCCESS"),
            ModalKind::Error => write!(f, "ERROR"),
        }
    }
}

/// A notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier
    pub id: NotificationId,
    /// Target dialog
    pub kind: ModalKind,
    /// Message text
    pub message: String,
    /// Logical time the notification was raised (in milliseconds)
    pub timestamp_ms: u64,
    /// Whether the surface was found and made visible
    pub displayed: bool,
}

impl Notification {
    /// Creates a new notification
    pub fn new(kind: ModalKind, message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            id: NotificationId::new(),
            kind,
            message: message.into(),
            timestamp_ms,
            displayed: false,
        }
    }

    /// Creates a success notification
    pub fn success(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(ModalKind::Success, message, timestamp_ms)
    }

    /// Creates an error notification
    pub fn error(message: impl Into<String>, timestamp_ms: u64) -> Self {
        Self::new(ModalKind::Error, message, timestamp_ms)
    }
}

/// One modal dialog in the page
///
/// Each part is optional because the hosting document may not contain it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalSurface {
    /// Message area (`None` when the document has no text element)
    pub text: Option<String>,
    /// Dialog visibility (`None` when the document has no dialog element)
    pub active: Option<bool>,
    /// Close button focus (`None` when the document has no close button)
    pub close_focused: Option<bool>,
}

impl ModalSurface {
    /// A dialog with every element present
    pub fn complete() -> Self {
        Self {
            text: Some(String::new()),
            active: Some(false),
            close_focused: Some(false),
        }
    }

    /// A dialog absent from the document
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active == Some(true)
    }

    pub fn message(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn deactivate(&mut self) {
        if let Some(active) = self.active.as_mut() {
            *active = false;
        }
        if let Some(focused) = self.close_focused.as_mut() {
            *focused = false;
        }
    }
}

/// Modal dialogs sharing one dimming overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalLayer {
    /// Overlay visibility (`None` when the document has no overlay)
    pub overlay: Option<bool>,
    pub success: ModalSurface,
    pub error: ModalSurface,
}

impl ModalLayer {
    /// Overlay plus both dialogs
    pub fn complete() -> Self {
        Self {
            overlay: Some(false),
            success: ModalSurface::complete(),
            error: ModalSurface::complete(),
        }
    }

    fn surface(&self, kind: ModalKind) -> &ModalSurface {
        match kind {
            ModalKind::Success => &self.success,
            ModalKind::Error => &self.error,
        }
    }

    fn surface_mut(&mut self, kind: ModalKind) -> &mut ModalSurface {
        match kind {
            ModalKind::Success => &mut self.success,
            ModalKind::Error => &mut self.error,
        }
    }

    /// Writes the message and makes the dialog visible
    ///
    /// Returns true when the dialog ended up visible.
    fn show(&mut self, kind: ModalKind, message: &str) -> bool {
        match self.surface_mut(kind).text.as_mut() {
            Some(text) => {
                text.clear();
                text.push_str(message);
            }
            None => return false,
        }

        // No overlay: the message is written but nothing is shown
        match self.overlay.as_mut() {
            Some(overlay) => *overlay = true,
            None => return false,
        }

        let surface = self.surface_mut(kind);
        let shown = match surface.active.as_mut() {
            Some(active) => {
                *active = true;
                true
            }
            None => false,
        };
        if let Some(focused) = surface.close_focused.as_mut() {
            *focused = true;
        }
        shown
    }

    fn hide(&mut self, kind: ModalKind) {
        self.surface_mut(kind).deactivate();
        let any_active = self.success.is_active() || self.error.is_active();
        if let Some(overlay) = self.overlay.as_mut() {
            *overlay = any_active;
        }
    }
}

impl Default for ModalLayer {
    fn default() -> Self {
        Self::complete()
    }
}

/// Notification controller
pub struct NotificationController {
    /// Dialog surfaces
    layer: ModalLayer,
    /// All notifications raised so far (bounded)
    notifications: VecDeque<Notification>,
    /// Status output text
    status: String,
    /// Current logical time (in milliseconds)
    current_time_ms: u64,
}

impl NotificationController {
    /// Creates a controller over a complete modal layer
    pub fn new() -> Self {
        Self::with_layer(ModalLayer::complete())
    }

    /// Creates a controller over the given surfaces
    pub fn with_layer(layer: ModalLayer) -> Self {
        Self {
            layer,
            notifications: VecDeque::new(),
            status: String::new(),
            current_time_ms: 0,
        }
    }

    /// Sets the current time (for timestamps)
    pub fn set_time(&mut self, time_ms: u64) {
        self.current_time_ms = time_ms;
    }

    /// Returns the current time
    pub fn current_time(&self) -> u64 {
        self.current_time_ms
    }

    /// Shows the success dialog with `message`
    pub fn show_success(&mut self, message: &str) -> bool {
        self.show(ModalKind::Success, message)
    }

    /// Shows the error dialog with `message`
    pub fn show_error(&mut self, message: &str) -> bool {
        self.show(ModalKind::Error, message)
    }

    fn show(&mut self, kind: ModalKind, message: &str) -> bool {
        let mut notification = Notification::new(kind, message, self.current_time_ms);
        notification.displayed = self.layer.show(kind, message);
        let displayed = notification.displayed;

        self.notifications.push_back(notification);
        while self.notifications.len() > MAX_NOTIFICATION_HISTORY {
            self.notifications.pop_front();
        }
        displayed
    }

    /// Closes one dialog (its close button was pressed)
    pub fn dismiss(&mut self, kind: ModalKind) {
        self.layer.hide(kind);
    }

    /// Closes every dialog
    pub fn dismiss_all(&mut self) {
        self.layer.hide(ModalKind::Success);
        self.layer.hide(ModalKind::Error);
    }

    /// Returns true if the dialog is currently visible
    pub fn is_visible(&self, kind: ModalKind) -> bool {
        self.layer.overlay == Some(true) && self.layer.surface(kind).is_active()
    }

    /// Message currently written into a dialog
    pub fn modal_text(&self, kind: ModalKind) -> Option<&str> {
        self.layer.surface(kind).message()
    }

    /// Returns the dialog surfaces
    pub fn layer(&self) -> &ModalLayer {
        &self.layer
    }

    /// Updates the status output
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Returns the status output
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns all recent notifications, most recent first
    pub fn recent_notifications(&self, limit: usize) -> Vec<&Notification> {
        self.notifications.iter().rev().take(limit).collect()
    }

    /// Returns the most recent notification
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    /// Returns notifications for one dialog
    pub fn notifications_for(&self, kind: ModalKind) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.kind == kind)
            .collect()
    }

    /// Returns the total number of notifications in history
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }
}

impl Default for NotificationController {
    fn default() -> Self {
        Self::new()
    }
}
