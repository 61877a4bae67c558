//! Masking of secrets in command lines and command output.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement for every masked value.
pub const MASK: &str = "***";

/// `--password=value`, `--db-password='value'`, `password="value"`.
#[allow(clippy::expect_used)]
static PASSWORD_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(-{0,2}[\w-]*password=)('[^']*'|"[^"]*"|[^\s'"]+)"#).expect("valid regex")
});

/// `-psecret`, as accepted by the database client.
#[allow(clippy::expect_used)]
static SHORT_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|\s)(['"]?)-p([^\s'"]+)"#).expect("valid regex")
});

/// Returns `text` with password values replaced by [`MASK`].
///
/// Quoting around a masked value is preserved.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let masked = PASSWORD_OPTION.replace_all(text, |caps: &regex::Captures<'_>| {
        let value = &caps[2];
        let quote = match value.chars().next() {
            Some(q @ ('\'' | '"')) => q.to_string(),
            _ => String::new(),
        };
        format!("{}{quote}{MASK}{quote}", &caps[1])
    });
    SHORT_PASSWORD
        .replace_all(&masked, format!("${{1}}${{2}}-p{MASK}").as_str())
        .into_owned()
}
