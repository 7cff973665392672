//! Sensitive data marker for automatic redaction
//!
//! API credentials travel through the repository wrapped in `Sensitive<T>`
//! so that `{:?}` on a host record (or a log field) never prints them.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use wzhosts_core_types::Sensitive;
///
/// let password = Sensitive::new("wazuh");
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(format!("{}", password), "***REDACTED***");
///
/// // Access the actual value when needed
/// assert_eq!(password.expose(), &"wazuh");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only the record codec and credential consumers should need this.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Eq> Eq for Sensitive<T> {}

impl From<String> for Sensitive<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Sensitive<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("my-secret-password");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("my-secret-password"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("api-key-12345");
        let display_str = format!("{}", secret);
        assert_eq!(display_str, "***REDACTED***");
        assert!(!display_str.contains("api-key"));
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("wazuh"));
        assert_eq!(secret.expose(), "wazuh");
        assert_eq!(secret.into_inner(), "wazuh");
    }

    #[test]
    fn test_sensitive_equality_compares_inner_value() {
        let a: Sensitive<String> = "wazuh".into();
        let b: Sensitive<String> = String::from("wazuh").into();
        let c: Sensitive<String> = "other".into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sensitive_inside_host_like_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Api {
            username: String,
            password: Sensitive<String>,
        }

        let api = Api {
            username: "wazuh-wui".to_string(),
            password: Sensitive::new("S3cr3t!".to_string()),
        };

        let debug_str = format!("{:?}", api);
        assert!(debug_str.contains("wazuh-wui"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("S3cr3t!"));
    }
}
