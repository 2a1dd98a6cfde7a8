//! HTTP transport port

use std::future::Future;

use garage_domain::{ApiError, ApiRequest, ApiResponse};

/// Dispatches a fully signed request.
///
/// Any response the server produced, whatever its status, is returned as
/// `Ok`. `Err` is reserved for failures where no response exists: timeouts,
/// connection errors, unbuildable URLs.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received.
    fn dispatch(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}
