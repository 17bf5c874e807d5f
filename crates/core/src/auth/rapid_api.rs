//! RapidAPI marketplace header authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Header carrying the subscriber key.
pub const RAPIDAPI_KEY_HEADER: &str = "x-rapidapi-key";
/// Header carrying the marketplace host.
pub const RAPIDAPI_HOST_HEADER: &str = "x-rapidapi-host";

/// Authenticator requiring the `X-RapidAPI-Key` / `X-RapidAPI-Host` pair.
///
/// Both headers must be present. The key must equal the configured key; the
/// host is only compared when one is configured.
pub struct RapidApiAuthenticator {
    expected_key: String,
    expected_host: Option<String>,
}

impl RapidApiAuthenticator {
    pub fn new(api_key: String, api_host: Option<String>) -> Self {
        Self {
            expected_key: api_key,
            expected_host: api_host,
        }
    }

    fn header<'a>(request: &'a AuthRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl Authenticator for RapidApiAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let key = Self::header(request, RAPIDAPI_KEY_HEADER);
        let host = Self::header(request, RAPIDAPI_HOST_HEADER);

        let (key, host) = match (key, host) {
            (Some(k), Some(h)) => (k, h),
            _ => return Err(AuthError::NotAuthenticated),
        };

        if !constant_time_eq(key.as_bytes(), self.expected_key.as_bytes()) {
            return Err(AuthError::InvalidCredentials(
                "The provided RapidAPI key is not valid".to_string(),
            ));
        }

        if let Some(expected_host) = &self.expected_host {
            if !host.eq_ignore_ascii_case(expected_host) {
                return Err(AuthError::InvalidCredentials(format!(
                    "Unexpected RapidAPI host: {}",
                    host
                )));
            }
        }

        Ok(Identity {
            user_id: "rapidapi_subscriber".to_string(),
            method: "rapid_api".to_string(),
            claims: std::collections::HashMap::from([(
                "host".to_string(),
                serde_json::Value::String(host.to_string()),
            )]),
        })
    }

    fn method_name(&self) -> &'static str {
        "rapid_api"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn make_request(headers: Vec<(&str, &str)>) -> AuthRequest {
        AuthRequest {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            source_ip: "127.0.0.1".parse::<IpAddr>().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_valid_header_pair() {
        let auth = RapidApiAuthenticator::new("secret-key".to_string(), None);
        let request = make_request(vec![
            ("X-RapidAPI-Key", "secret-key"),
            ("X-RapidAPI-Host", "converter.p.rapidapi.com"),
        ]);

        let identity = auth.authenticate(&request).await.unwrap();
        assert_eq!(identity.user_id, "rapidapi_subscriber");
        assert_eq!(identity.method, "rapid_api");
        assert_eq!(
            identity.claims.get("host"),
            Some(&serde_json::json!("converter.p.rapidapi.com"))
        );
    }

    #[tokio::test]
    async fn test_missing_host_header() {
        let auth = RapidApiAuthenticator::new("secret-key".to_string(), None);
        let request = make_request(vec![("X-RapidAPI-Key", "secret-key")]);

        let result = auth.authenticate(&request).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_missing_both_headers() {
        let auth = RapidApiAuthenticator::new("secret-key".to_string(), None);
        let result = auth.authenticate(&make_request(vec![])).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_wrong_key() {
        let auth = RapidApiAuthenticator::new("secret-key".to_string(), None);
        let request = make_request(vec![
            ("X-RapidAPI-Key", "wrong"),
            ("X-RapidAPI-Host", "converter.p.rapidapi.com"),
        ]);

        let result = auth.authenticate(&request).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_configured_host_is_enforced() {
        let auth = RapidApiAuthenticator::new(
            "secret-key".to_string(),
            Some("converter.p.rapidapi.com".to_string()),
        );

        let wrong_host = make_request(vec![
            ("X-RapidAPI-Key", "secret-key"),
            ("X-RapidAPI-Host", "other.p.rapidapi.com"),
        ]);
        assert!(matches!(
            auth.authenticate(&wrong_host).await,
            Err(AuthError::InvalidCredentials(_))
        ));

        let right_host = make_request(vec![
            ("X-RapidAPI-Key", "secret-key"),
            ("X-RapidAPI-Host", "Converter.P.RapidAPI.com"),
        ]);
        assert!(auth.authenticate(&right_host).await.is_ok());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }
}
