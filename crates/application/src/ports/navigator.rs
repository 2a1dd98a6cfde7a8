//! Navigation port

use std::fmt;

/// Application routes the client may send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in entry point.
    Login,
    /// Application home.
    Home,
}

impl Route {
    /// Path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Hands navigation requests to the UI layer.
///
/// Implementations must not block; the call happens on the response path
/// of a failed request.
pub trait Navigator: Send + Sync {
    /// Requests navigation to `route`.
    fn navigate(&self, route: Route);
}
