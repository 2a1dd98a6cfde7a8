//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the client core and the outside
//! world. Each one is implemented by an adapter in the infrastructure layer.

mod clock;
mod navigator;
mod refresher;
mod storage;
mod transport;

pub use clock::Clock;
pub use navigator::{Navigator, Route};
pub use refresher::TokenRefresher;
pub use storage::{KeyValueStorage, StorageError};
pub use transport::Transport;
