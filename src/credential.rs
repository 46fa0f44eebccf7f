//! Authentication materials attached to outgoing requests.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Supplies either a bearer token or a basic-auth pair.
///
/// When `is_bearer` is true the client sends `Authorization: Bearer <secret>`;
/// otherwise it sends HTTP Basic auth built from `email` and `secret`.
#[cfg_attr(test, mockall::automock)]
pub trait Credential: Send + Sync {
    fn is_bearer(&self) -> bool;
    fn email(&self) -> String;
    fn secret(&self) -> String;
}

/// Email and password, sent as HTTP Basic auth.
pub struct BasicAuthCredential {
    email: String,
    password: SecretString,
}

impl BasicAuthCredential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into()),
        }
    }
}

impl Credential for BasicAuthCredential {
    fn is_bearer(&self) -> bool {
        false
    }

    fn email(&self) -> String {
        self.email.clone()
    }

    fn secret(&self) -> String {
        self.password.expose_secret().clone()
    }
}

impl fmt::Debug for BasicAuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredential")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// API token sent as HTTP Basic auth with the username `{email}/token`.
pub struct ApiTokenCredential {
    email: String,
    token: SecretString,
}

impl ApiTokenCredential {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: SecretString::new(token.into()),
        }
    }
}

impl Credential for ApiTokenCredential {
    fn is_bearer(&self) -> bool {
        false
    }

    fn email(&self) -> String {
        format!("{}/token", self.email)
    }

    fn secret(&self) -> String {
        self.token.expose_secret().clone()
    }
}

impl fmt::Debug for ApiTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTokenCredential")
            .field("email", &self.email)
            .field("token", &"***")
            .finish()
    }
}

/// OAuth access token sent as `Authorization: Bearer`.
pub struct BearerTokenCredential {
    token: SecretString,
}

impl BearerTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

impl Credential for BearerTokenCredential {
    fn is_bearer(&self) -> bool {
        true
    }

    // Bearer tokens carry no identity.
    fn email(&self) -> String {
        String::new()
    }

    fn secret(&self) -> String {
        self.token.expose_secret().clone()
    }
}

impl fmt::Debug for BearerTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenCredential")
            .field("token", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_credential() {
        let cred = BasicAuthCredential::new("agent@example.com", "hunter2");
        assert!(!cred.is_bearer());
        assert_eq!(cred.email(), "agent@example.com");
        assert_eq!(cred.secret(), "hunter2");
    }

    #[test]
    fn test_api_token_credential_appends_token_suffix() {
        let cred = ApiTokenCredential::new("agent@example.com", "abc123");
        assert!(!cred.is_bearer());
        assert_eq!(cred.email(), "agent@example.com/token");
        assert_eq!(cred.secret(), "abc123");
    }

    #[test]
    fn test_bearer_token_credential() {
        let cred = BearerTokenCredential::new("oauth-token");
        assert!(cred.is_bearer());
        assert_eq!(cred.email(), "");
        assert_eq!(cred.secret(), "oauth-token");
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let basic = format!("{:?}", BasicAuthCredential::new("a@b.c", "hunter2"));
        let token = format!("{:?}", ApiTokenCredential::new("a@b.c", "abc123"));
        let bearer = format!("{:?}", BearerTokenCredential::new("oauth-token"));

        assert!(!basic.contains("hunter2"));
        assert!(!token.contains("abc123"));
        assert!(!bearer.contains("oauth-token"));
        assert!(basic.contains("a@b.c"));
    }
}
