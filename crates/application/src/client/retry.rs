//! Response classification for the retry policy.

use garage_domain::{ApiRequest, StatusCode};

/// What the client does with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Refresh the token pair and replay the request once.
    Refresh,
    /// Report a permission failure and send the user home.
    Forbidden,
    /// Hand the response to the caller unchanged.
    PassThrough,
}

/// Decides how to handle a response with `status` to `request`.
///
/// Only a 401 on a request that is neither a replay nor aimed at an auth
/// endpoint is eligible for refresh; this bounds every request to a single
/// replay and keeps login/refresh failures from refreshing themselves.
#[must_use]
pub fn classify(status: StatusCode, request: &ApiRequest) -> RetryDecision {
    match status {
        StatusCode::UNAUTHORIZED if !request.retry && !request.is_auth_endpoint() => {
            RetryDecision::Refresh
        }
        StatusCode::FORBIDDEN => RetryDecision::Forbidden,
        _ => RetryDecision::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_resource_request_refreshes() {
        let request = ApiRequest::get("/service-orders");
        assert_eq!(classify(StatusCode(401), &request), RetryDecision::Refresh);
    }

    #[test]
    fn test_unauthorized_retry_passes_through() {
        let request = ApiRequest::get("/service-orders").into_retry();
        assert_eq!(classify(StatusCode(401), &request), RetryDecision::PassThrough);
    }

    #[test]
    fn test_unauthorized_auth_endpoints_pass_through() {
        for path in ["/auth/login", "/auth/register", "/auth/refresh"] {
            let request = ApiRequest::post(path);
            assert_eq!(classify(StatusCode(401), &request), RetryDecision::PassThrough);
        }
    }

    #[test]
    fn test_forbidden_on_any_request() {
        assert_eq!(
            classify(StatusCode(403), &ApiRequest::delete("/vehicles/3")),
            RetryDecision::Forbidden
        );
        assert_eq!(
            classify(StatusCode(403), &ApiRequest::get("/clients").into_retry()),
            RetryDecision::Forbidden
        );
    }

    #[test]
    fn test_other_statuses_pass_through() {
        let request = ApiRequest::get("/clients");
        for status in [200, 204, 400, 404, 409, 500, 503] {
            assert_eq!(classify(StatusCode(status), &request), RetryDecision::PassThrough);
        }
    }
}
