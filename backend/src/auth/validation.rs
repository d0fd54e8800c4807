//! Registration field rules.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Symbols a password may contain; at least one is required.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least eight characters drawn from ASCII letters, digits and
/// [`PASSWORD_SYMBOLS`], with one of each class present.
pub fn is_strong_password(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c);

    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user@example.com", true)]
    #[case("first.last@sub.example.org", true)]
    #[case("no-at-sign.example.com", false)]
    #[case("user@nodot", false)]
    #[case("user name@example.com", false)]
    #[case("@example.com", false)]
    #[case("", false)]
    fn test_email_pattern(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid, "{email}");
    }

    #[rstest]
    #[case("Passw0rd!", true)]
    #[case("aB3$aB3$", true)]
    #[case("Password!", false)] // no digit
    #[case("passw0rd!", false)] // no uppercase
    #[case("PASSW0RD!", false)] // no lowercase
    #[case("Passw0rdx", false)] // no symbol
    #[case("Pa0!", false)] // too short
    #[case("Passw0rd#", false)] // symbol outside the set
    #[case("Passw0rd! ", false)] // whitespace
    fn test_password_rules(#[case] password: &str, #[case] strong: bool) {
        assert_eq!(is_strong_password(password), strong, "{password}");
    }
}
