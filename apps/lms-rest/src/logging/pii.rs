use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Regex patterns used for log redaction.
pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// Compact JWT: three base64url segments separated by dots
    pub fn jwt() -> &'static Regex {
        static JWT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}").unwrap()
        });
        &JWT_REGEX
    }

    /// Opaque base64/base64url runs of 20 chars or more (token secrets)
    pub fn opaque_token() -> &'static Regex {
        static OPAQUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9+/_-]{20,}={0,2}").unwrap()
        });
        &OPAQUE_REGEX
    }

    /// `password=...` in form bodies or query strings
    pub fn password_param() -> &'static Regex {
        static PASSWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"(?i)(password|refresh_token|access_token|token)=[^&\s]*").unwrap()
        });
        &PASSWORD_REGEX
    }
}

/// Mask credentials and personal data in a string bound for the logs.
///
/// Order: credential parameters, then JWTs, then emails, then opaque tokens.
pub fn redact(input: &str) -> String {
    let params = PiiRegexRegistry::password_param().replace_all(input, "$1=[REDACTED]");
    let jwts = PiiRegexRegistry::jwt().replace_all(&params, "[REDACTED_TOKEN]");

    let emails = PiiRegexRegistry::email().replace_all(&jwts, |caps: &regex::Captures| {
        let full = &caps[0];
        match full.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                format!("{}***@{domain}", &local[..1])
            }
            _ => full.to_string(),
        }
    });

    PiiRegexRegistry::opaque_token()
        .replace_all(&emails, "[REDACTED_TOKEN]")
        .to_string()
}

/// Display wrapper that redacts on format.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
