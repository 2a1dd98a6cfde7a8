//! Token refresh adapters.

mod http_refresher;

pub use http_refresher::HttpTokenRefresher;
