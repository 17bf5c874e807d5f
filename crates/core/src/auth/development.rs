use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Accepts every request. Selected with `auth.method = "none"`; the config
/// has no default auth section, so this must be chosen explicitly.
#[derive(Debug, Default)]
pub struct DevelopmentAuthenticator;

impl DevelopmentAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for DevelopmentAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::developer())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }

    fn is_development_mode(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_accepts_request_without_headers() {
        let auth = DevelopmentAuthenticator::new();
        let request = AuthRequest {
            headers: HashMap::new(),
            source_ip: "10.0.0.1".parse().unwrap(),
        };

        let identity = auth.authenticate(&request).await.unwrap();
        assert_eq!(identity.user_id, "developer");
        assert!(auth.is_development_mode());
        assert_eq!(auth.method_name(), "none");
    }
}
