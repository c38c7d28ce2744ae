//! Login credentials received over RPC.

use serde::Deserialize;
use std::fmt;

/// Username/password pair for the platform login.
///
/// `Debug` never prints the password; credentials pass through request
/// logging on their way to the provider.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_rpc_payload() {
        let json = r#"{"username": "ada@example.invalid", "password": "hunter2"}"#;
        let credentials: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(credentials.username, "ada@example.invalid");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn debug_redacts_password() {
        let credentials = Credentials::new("ada@example.invalid", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("ada@example.invalid"));
        assert!(!rendered.contains("hunter2"));
    }
}
