use reqwest_middleware::RequestBuilder;

use super::types::ApiToken;

#[derive(Clone, Default)]
pub enum AuthStrategy {
    Bearer(ApiToken),
    #[default]
    None,
}

impl AuthStrategy {
    #[must_use]
    pub const fn bearer(token: ApiToken) -> Self {
        Self::Bearer(token)
    }

    /// Bearer auth when a non-blank token is present, otherwise none.
    #[must_use]
    pub fn from_optional(token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Self::Bearer(ApiToken::new(t.to_string())),
            None => Self::None,
        }
    }

    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(token) => {
                request.header("Authorization", format!("Bearer {}", token.as_str()))
            }
            Self::None => request,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self {
            Self::Bearer(token) => !token.is_empty(),
            Self::None => true,
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_auth() {
        let auth = AuthStrategy::bearer(ApiToken::new("session-token-123"));
        assert!(auth.is_configured());
        let debug = format!("{auth:?}");
        assert!(debug.contains("Bearer"));
        assert!(!debug.contains("session-token-123"));
    }

    #[test]
    fn test_from_optional() {
        assert!(matches!(AuthStrategy::from_optional(None), AuthStrategy::None));
        assert!(matches!(
            AuthStrategy::from_optional(Some("   ")),
            AuthStrategy::None
        ));
        assert!(matches!(
            AuthStrategy::from_optional(Some("abc")),
            AuthStrategy::Bearer(_)
        ));
    }

    #[test]
    fn test_empty_token_not_configured() {
        let auth = AuthStrategy::bearer(ApiToken::new(""));
        assert!(!auth.is_configured());
        assert!(AuthStrategy::None.is_configured());
    }
}
