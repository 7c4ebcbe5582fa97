//! Input validation for everything that crosses a trust boundary: email
//! addresses and uids entered in the dashboard or on the command line, and
//! the host/port the server is asked to bind.
//!
//! Validators return the trimmed, canonical value so callers never operate on
//! raw user input.

use thiserror::Error;

/// Maximum length accepted for an email address (RFC 5321 limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length accepted for an identity uid.
pub const MAX_UID_LENGTH: usize = 128;

/// Validation failures with enough context to produce a useful message
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("value is empty")]
    Empty,

    #[error("value too long: {actual} characters (max: {max})")]
    TooLong { actual: usize, max: usize },

    #[error("value contains control characters")]
    ControlCharacters,

    #[error("invalid format: {reason}")]
    InvalidFormat { reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address and return its trimmed form.
///
/// This is a shape check, not RFC 5322 parsing: one `@`, a non-empty local
/// part, and a dotted domain. The identity provider is the authority on
/// whether the address actually exists.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            actual: email.len(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    if email.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }

    if email.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidFormat {
            reason: "email addresses cannot contain whitespace".to_string(),
        });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidFormat {
            reason: "missing '@'".to_string(),
        });
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            reason: "expected exactly one '@' between local part and domain".to_string(),
        });
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidFormat {
            reason: "domain must contain an interior dot".to_string(),
        });
    }

    Ok(email.to_string())
}

/// Validate an identity uid and return its trimmed form.
///
/// Uids are opaque identifiers assigned by the provider; we only reject
/// values that cannot possibly be one.
pub fn validate_uid(uid: &str) -> ValidationResult<String> {
    let uid = uid.trim();

    if uid.is_empty() {
        return Err(ValidationError::Empty);
    }

    if uid.len() > MAX_UID_LENGTH {
        return Err(ValidationError::TooLong {
            actual: uid.len(),
            max: MAX_UID_LENGTH,
        });
    }

    if uid
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || c == '/')
    {
        return Err(ValidationError::InvalidFormat {
            reason: "uids cannot contain whitespace, control characters, or '/'".to_string(),
        });
    }

    Ok(uid.to_string())
}

/// Validate a hostname or IP address for server binding.
pub fn validate_hostname(hostname: &str) -> ValidationResult<String> {
    if hostname.is_empty() {
        return Err(ValidationError::Empty);
    }

    if hostname.len() > 253 {
        return Err(ValidationError::TooLong {
            actual: hostname.len(),
            max: 253,
        });
    }

    if hostname.contains('\0') || hostname.chars().any(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacters);
    }

    // IP literals are fine as-is
    if hostname.parse::<std::net::IpAddr>().is_ok() {
        return Ok(hostname.to_string());
    }

    if hostname.starts_with('.') || hostname.ends_with('.') {
        return Err(ValidationError::InvalidFormat {
            reason: "hostnames cannot start or end with dots".to_string(),
        });
    }

    for label in hostname.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(ValidationError::InvalidFormat {
                reason: "each hostname label must be 1-63 characters".to_string(),
            });
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(ValidationError::InvalidFormat {
                reason: "hostname labels cannot start or end with hyphens".to_string(),
            });
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::InvalidFormat {
                reason: format!("invalid characters in hostname label '{label}'"),
            });
        }
    }

    Ok(hostname.to_string())
}

/// Validate a TCP port for server binding. Port 0 is rejected because the
/// dashboard address is printed and shared; an ephemeral port is never what
/// the operator meant.
pub fn validate_port(port: u16) -> ValidationResult<u16> {
    if port == 0 {
        return Err(ValidationError::InvalidFormat {
            reason: "port 0 is not a valid listen port".to_string(),
        });
    }
    Ok(port)
}
