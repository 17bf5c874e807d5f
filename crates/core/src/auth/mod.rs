mod development;
mod identity;
mod rapid_api;

pub use development::DevelopmentAuthenticator;
pub use identity::{AuthError, AuthRequest, Authenticator, Identity};
pub use rapid_api::{RapidApiAuthenticator, RAPIDAPI_HOST_HEADER, RAPIDAPI_KEY_HEADER};

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(DevelopmentAuthenticator::new())),
        AuthMethod::RapidApi => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "api_key must be set when using RapidApi auth method".to_string(),
                    )
                })?;
            Ok(Box::new(RapidApiAuthenticator::new(
                api_key,
                config.api_host.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;

    #[test]
    fn test_create_authenticator_none() {
        let config = AuthConfig {
            method: AuthMethod::None,
            api_key: None,
            api_host: None,
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_rapid_api() {
        let config = AuthConfig {
            method: AuthMethod::RapidApi,
            api_key: Some("secret-key".to_string()),
            api_host: None,
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "rapid_api");
    }

    #[test]
    fn test_create_authenticator_rapid_api_missing_key() {
        let config = AuthConfig {
            method: AuthMethod::RapidApi,
            api_key: Some(String::new()),
            api_host: None,
        };
        let result = create_authenticator(&config);
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
