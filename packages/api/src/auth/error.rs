//! Authentication errors.
//!
//! The identity REST API reports failures as bare codes such as
//! `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be at least 6 characters`.
//! [`AuthError::from_server`] turns those into the same `auth/*` codes and
//! `Firebase: ...` messages the vendor's web SDK shows, so the login form can
//! display them verbatim.

use thiserror::Error;

/// Prefix the vendor puts in front of every auth error message.
pub const VENDOR_PREFIX: &str = "Firebase: ";

pub mod codes {
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const MISSING_PASSWORD: &str = "auth/missing-password";
    pub const MISSING_EMAIL: &str = "auth/missing-email";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    pub const USER_TOKEN_EXPIRED: &str = "auth/user-token-expired";
    pub const INVALID_USER_TOKEN: &str = "auth/invalid-user-token";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// A failed identity operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    /// Vendor code, e.g. `auth/invalid-email`.
    pub code: String,
    /// Vendor message, e.g. `Firebase: Error (auth/invalid-email).`
    pub message: String,
}

impl AuthError {
    /// An error with the generic `Error (code).` wording.
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            message: format!("{VENDOR_PREFIX}Error ({code})."),
        }
    }

    /// An error carrying a server-provided detail sentence.
    pub fn with_detail(code: &str, detail: &str) -> Self {
        Self {
            code: code.to_string(),
            message: format!("{VENDOR_PREFIX}{detail} ({code})."),
        }
    }

    /// Map a REST error string (`CODE` or `CODE : detail`).
    pub fn from_server(raw: &str) -> Self {
        let (server_code, detail) = match raw.split_once(':') {
            Some((code, detail)) => (code.trim(), Some(detail.trim())),
            None => (raw.trim(), None),
        };
        let code = map_server_code(server_code);
        match detail {
            Some(detail) if !detail.is_empty() => Self::with_detail(&code, detail),
            _ => Self::from_code(&code),
        }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        tracing::warn!("identity request failed: {err}");
        Self::from_code(codes::NETWORK_REQUEST_FAILED)
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::warn!("unexpected identity response: {err}");
        Self::from_code(codes::INTERNAL_ERROR)
    }

    /// The message with the vendor prefix removed, for display.
    pub fn display_message(&self) -> String {
        strip_vendor_prefix(&self.message)
    }
}

/// Remove the first occurrence of the vendor prefix from a message.
pub fn strip_vendor_prefix(message: &str) -> String {
    message.replacen(VENDOR_PREFIX, "", 1)
}

fn map_server_code(server_code: &str) -> String {
    let mapped = match server_code {
        "EMAIL_EXISTS" => codes::EMAIL_ALREADY_IN_USE,
        "INVALID_EMAIL" | "INVALID_IDENTIFIER" => codes::INVALID_EMAIL,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" | "INVALID_PENDING_TOKEN" => {
            codes::INVALID_CREDENTIAL
        }
        "INVALID_PASSWORD" => codes::WRONG_PASSWORD,
        "EMAIL_NOT_FOUND" => codes::USER_NOT_FOUND,
        "MISSING_PASSWORD" => codes::MISSING_PASSWORD,
        "MISSING_EMAIL" => codes::MISSING_EMAIL,
        "WEAK_PASSWORD" => codes::WEAK_PASSWORD,
        "USER_DISABLED" => codes::USER_DISABLED,
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "RESET_PASSWORD_EXCEED_LIMIT" => {
            codes::TOO_MANY_REQUESTS
        }
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => codes::OPERATION_NOT_ALLOWED,
        "TOKEN_EXPIRED" | "USER_NOT_FOUND" => codes::USER_TOKEN_EXPIRED,
        "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" => codes::INVALID_USER_TOKEN,
        other => {
            let slug = other
                .to_lowercase()
                .split(|c: char| c == '_' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("-");
            return format!("auth/{slug}");
        }
    };
    mapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_sdk_wording() {
        let err = AuthError::from_server("EMAIL_EXISTS");
        assert_eq!(err.code, codes::EMAIL_ALREADY_IN_USE);
        assert_eq!(err.message, "Firebase: Error (auth/email-already-in-use).");

        let err = AuthError::from_server("INVALID_LOGIN_CREDENTIALS");
        assert_eq!(err.display_message(), "Error (auth/invalid-credential).");
    }

    #[test]
    fn test_detail_is_kept() {
        let err = AuthError::from_server("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(err.code, codes::WEAK_PASSWORD);
        assert_eq!(
            err.message,
            "Firebase: Password should be at least 6 characters (auth/weak-password)."
        );
        assert_eq!(
            err.display_message(),
            "Password should be at least 6 characters (auth/weak-password)."
        );
    }

    #[test]
    fn test_unknown_code_is_slugged() {
        let err = AuthError::from_server("QUOTA_EXCEEDED");
        assert_eq!(err.code, "auth/quota-exceeded");
    }

    #[test]
    fn test_strip_only_first_prefix() {
        assert_eq!(
            strip_vendor_prefix("Firebase: Firebase: twice"),
            "Firebase: twice"
        );
        assert_eq!(strip_vendor_prefix("no prefix"), "no prefix");
    }
}
