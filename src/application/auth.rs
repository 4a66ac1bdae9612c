//! Shared-secret API key verification.

use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiAuthError {
    #[error("missing api key")]
    Missing,
    #[error("invalid api key")]
    Invalid,
}

/// Marker attached to authenticated requests.
#[derive(Debug, Clone)]
pub struct ApiPrincipal {
    pub label: String,
}

/// Holds the configured shared secret and checks presented credentials
/// against it. The secret is loaded once at startup and never exposed:
/// the type deliberately has no `Debug` or `Display` and never appears in
/// error values or log records.
pub struct ApiKeyGuard {
    secret: String,
}

impl ApiKeyGuard {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a presented header value. Missing and mismatched credentials
    /// both fail before any catalog operation runs; the comparison is
    /// constant-time to avoid leaking prefix information.
    pub fn authenticate(&self, presented: Option<&str>) -> Result<ApiPrincipal, ApiAuthError> {
        let presented = presented.ok_or(ApiAuthError::Missing)?;

        if self
            .secret
            .as_bytes()
            .ct_eq(presented.as_bytes())
            .unwrap_u8()
            == 0
        {
            return Err(ApiAuthError::Invalid);
        }

        Ok(ApiPrincipal {
            label: "api_key".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_secret_yields_principal() {
        let guard = ApiKeyGuard::new("sesame");
        let principal = guard.authenticate(Some("sesame")).expect("authenticated");
        assert_eq!(principal.label, "api_key");
    }

    #[test]
    fn missing_header_is_rejected() {
        let guard = ApiKeyGuard::new("sesame");
        assert!(matches!(
            guard.authenticate(None),
            Err(ApiAuthError::Missing)
        ));
    }

    #[test]
    fn wrong_value_is_rejected() {
        let guard = ApiKeyGuard::new("sesame");
        assert!(matches!(
            guard.authenticate(Some("open sesame")),
            Err(ApiAuthError::Invalid)
        ));
        assert!(matches!(
            guard.authenticate(Some("")),
            Err(ApiAuthError::Invalid)
        ));
    }
}
