//! Inbox channel: async handlers and the navigator send `UiEvent`s here; the
//! runtime drains it every frame.

use amperex_core::navigation::{Navigator, Redirect};
use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Delivers forced navigations to the reducer as [`UiEvent::Navigate`].
pub struct InboxNavigator {
    tx: UiEventSender,
}

impl InboxNavigator {
    pub fn new(tx: UiEventSender) -> Self {
        Self { tx }
    }
}

impl Navigator for InboxNavigator {
    fn navigate(&self, redirect: Redirect) {
        tracing::debug!(to = %redirect.to, "navigate");
        if self.tx.send(UiEvent::Navigate(redirect)).is_err() {
            tracing::debug!("inbox closed, dropping redirect");
        }
    }
}
