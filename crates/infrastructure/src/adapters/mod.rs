//! Adapter implementations for application ports.

mod navigator;
mod reqwest_transport;
mod system_clock;

pub use navigator::ChannelNavigator;
pub use reqwest_transport::ReqwestTransport;
pub(crate) use reqwest_transport::USER_AGENT;
pub use system_clock::SystemClock;
