use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 邮箱统一以小写存储
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 忽略大小写比较两个邮箱
pub fn same_email(a: &str, b: &str) -> bool {
    normalize_email(a) == normalize_email(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Max@Mustermann.DE "), "max@mustermann.de");
        assert!(same_email("max@mustermann.de", "MAX@mustermann.de"));
        assert!(validate_email("max@mustermann.de").is_ok());
        assert!(validate_email("max.mustermann").is_err());
    }
}
