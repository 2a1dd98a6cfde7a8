//! Channel-backed navigator.
//!
//! Navigation requests are queued on an unbounded channel and consumed by
//! whatever drives the UI. Sending never blocks or fails the request path;
//! once the receiver is gone, requests are logged and dropped.

use garage_application::{Navigator, Route};
use tokio::sync::mpsc;

/// Navigator forwarding routes to a receiver.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    /// Creates a navigator and the receiver the UI drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "navigation requested");
        if self.sender.send(route).is_err() {
            tracing::debug!(route = %route, "no navigation listener, dropping route");
        }
    }
}
