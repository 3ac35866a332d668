//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use std::fmt;

/// The `token_v2` session cookie used to read private workspaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Create a new session token with validation
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        let trimmed = token.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::InvalidToken {
                reason: "token cannot be empty".to_string(),
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c == ';') {
            return Err(ValidationError::InvalidToken {
                reason: "token must not contain whitespace or ';'".to_string(),
            });
        }

        if trimmed.len() < 20 {
            return Err(ValidationError::InvalidToken {
                reason: "token is too short".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the token as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact token in display
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "{}...", prefix)
    }
}

/// The serialized feed document, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeed(String);

impl RenderedFeed {
    pub fn new(content: String) -> Self {
        Self(content)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RenderedFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_validation() {
        assert!(AuthToken::new("").is_err());
        assert!(AuthToken::new("short").is_err());
        assert!(AuthToken::new("v02%3Auser_token_or_cookies; path=/").is_err());

        let token = AuthToken::new("  v02%3Auser_token_or_cookies%3Aabcdef  ").unwrap();
        assert_eq!(token.as_str(), "v02%3Auser_token_or_cookies%3Aabcdef");
        assert_eq!(token.to_string(), "v02%3Aus...");
    }
}
