//! Request signing.

use garage_domain::request::{AUTHORIZATION_HEADER, ORGANIZATION_HEADER};
use garage_domain::{ApiRequest, Session};

/// Returns a copy of `request` carrying the session's credentials.
///
/// Sets `Authorization: Bearer <token>` when the session has an access
/// token and `X-Organization-ID` when it is scoped to an organization. Any
/// stale values for those headers are dropped first, so a replayed request
/// never carries the token that was rejected. Without a session the request
/// goes out unauthenticated.
#[must_use]
pub fn sign_request(request: &ApiRequest, session: Option<&Session>) -> ApiRequest {
    let mut signed = request.clone();
    signed.headers.remove(AUTHORIZATION_HEADER);
    signed.headers.remove(ORGANIZATION_HEADER);

    let Some(session) = session else {
        return signed;
    };

    if let Some(token) = session.access_token() {
        signed
            .headers
            .set(AUTHORIZATION_HEADER, format!("Bearer {token}"));
    }
    if let Some(organization_id) = session.organization_id() {
        signed
            .headers
            .set(ORGANIZATION_HEADER, organization_id.to_string());
    }
    signed
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_domain::{Organization, TokenPair};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signs_with_bearer_and_tenant() {
        let session = Session::from_tokens(TokenPair::new("a1", "r1"))
            .with_organization(Organization::new(42, "Main Street Motors", "main-street"));

        let signed = sign_request(&ApiRequest::get("/vehicles"), Some(&session));

        assert_eq!(signed.headers.get("authorization"), Some("Bearer a1"));
        assert_eq!(signed.headers.get("x-organization-id"), Some("42"));
    }

    #[test]
    fn test_no_tenant_header_without_organization() {
        let session = Session::from_tokens(TokenPair::new("a1", "r1"));

        let signed = sign_request(&ApiRequest::get("/vehicles"), Some(&session));

        assert_eq!(signed.headers.get("Authorization"), Some("Bearer a1"));
        assert!(!signed.headers.contains(ORGANIZATION_HEADER));
    }

    #[test]
    fn test_unauthenticated_without_session() {
        let request = ApiRequest::get("/vehicles").with_header("Authorization", "Bearer stale");

        let signed = sign_request(&request, None);

        assert!(!signed.headers.contains(AUTHORIZATION_HEADER));
        assert!(!signed.headers.contains(ORGANIZATION_HEADER));
    }

    #[test]
    fn test_empty_access_token_is_not_sent() {
        let mut session = Session::from_tokens(TokenPair::new("a1", "r1"));
        session.access_token = String::new();

        let signed = sign_request(&ApiRequest::get("/clients"), Some(&session));

        assert!(!signed.headers.contains(AUTHORIZATION_HEADER));
    }

    #[test]
    fn test_original_request_is_untouched() {
        let session = Session::from_tokens(TokenPair::new("a1", "r1"));
        let request = ApiRequest::get("/clients");

        let _signed = sign_request(&request, Some(&session));

        assert!(request.headers.is_empty());
    }
}
