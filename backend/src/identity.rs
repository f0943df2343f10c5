//! Bearer credential verification
//!
//! Tokens come from an external identity provider. They are verified here
//! (signature, expiry, optional issuer and audience) before any claim is
//! trusted.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
}

/// Claims read from an identity token
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Turns a bearer credential into a verified identity
#[axum::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}

/// Verifies JWTs locally with a shared secret (HS256) or a public key (RS256)
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn from_config(config: &IdentityConfig) -> anyhow::Result<Self> {
        let (key, algorithm) = match config.public_key_pem.as_deref() {
            Some(pem) if !pem.trim().is_empty() => {
                (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256)
            }
            _ => {
                if config.secret.is_empty() {
                    anyhow::bail!("identity.secret or identity.public_key_pem must be set");
                }
                (DecodingKey::from_secret(config.secret.as_bytes()), Algorithm::HS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        // A configured issuer or audience must be present, not just valid when present
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".into());
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".into());
            }
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }

    fn verify_now(&self, token: &str) -> AppResult<Identity> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired",
                ErrorKind::InvalidIssuer => "Token issuer is not trusted",
                ErrorKind::InvalidAudience => "Token audience does not match",
                ErrorKind::InvalidSignature => "Token signature is invalid",
                _ => "Token is malformed",
            };
            AppError::InvalidCredential(reason.to_string())
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AppError::InvalidCredential("Token has no subject".into()));
        }
        if shared::validate_email(&claims.email).is_err() {
            return Err(AppError::InvalidCredential(
                "Token carries no usable email".into(),
            ));
        }

        Ok(Identity {
            subject_id: claims.sub,
            email: claims.email.trim().to_lowercase(),
            name: claims.name.filter(|n| !n.trim().is_empty()),
            email_verified: claims.email_verified.unwrap_or(false),
        })
    }
}

#[axum::async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        self.verify_now(token)
    }
}
