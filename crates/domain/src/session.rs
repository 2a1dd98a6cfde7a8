//! Session and credential types.
//!
//! A [`Session`] is the authenticated identity bundle for the console:
//! the token pair plus who the user is and which organization (tenant)
//! their requests are scoped to.

use serde::{Deserialize, Serialize};

/// Role of the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular workshop staff.
    #[default]
    User,
    /// Organization administrator.
    Admin,
}

impl Role {
    /// Returns true for administrators.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Tenant descriptor. When present, every request is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Numeric organization identifier.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// URL-safe slug.
    #[serde(default)]
    pub slug: String,
}

impl Organization {
    /// Creates an organization descriptor.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// Access/refresh token pair returned by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Longer-lived credential used only for refreshing.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// The authenticated identity bundle.
///
/// A session is only valid for persistence when both tokens are non-empty;
/// see [`Session::is_persistable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Credential used by the refresh coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Backend user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Role of the user.
    #[serde(default)]
    pub role: Role,
    /// Tenant the user acts for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
}

impl Session {
    /// Creates a session holding only a token pair.
    #[must_use]
    pub fn from_tokens(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            user_id: None,
            role: Role::default(),
            organization: None,
        }
    }

    /// Sets the user identity.
    #[must_use]
    pub fn with_user(mut self, user_id: i64, role: Role) -> Self {
        self.user_id = Some(user_id);
        self.role = role;
        self
    }

    /// Scopes the session to an organization.
    #[must_use]
    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Replaces both tokens, keeping identity and tenant untouched.
    pub fn apply_tokens(&mut self, tokens: TokenPair) {
        self.access_token = tokens.access_token;
        self.refresh_token = Some(tokens.refresh_token);
    }

    /// Returns the refresh token if one is present and non-empty.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the access token if it is non-empty.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        Some(self.access_token.as_str()).filter(|t| !t.is_empty())
    }

    /// Returns the organization id, if the session is tenant-scoped.
    #[must_use]
    pub fn organization_id(&self) -> Option<i64> {
        self.organization.as_ref().map(|org| org.id)
    }

    /// Both tokens are present and non-empty.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        self.access_token().is_some() && self.refresh_token().is_some()
    }
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates login credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Full name of the new user.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Name of the workshop to create alongside the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

/// Response of `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Credential used for refreshing.
    pub refresh_token: String,
    /// Backend user identifier.
    pub user_id: i64,
    /// Role of the user.
    pub role: Role,
    /// Tenant the user belongs to.
    #[serde(default)]
    pub organization: Option<Organization>,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: Some(response.refresh_token),
            user_id: Some(response.user_id),
            role: response.role,
            organization: response.organization,
        }
    }
}
