use crate::error::PostError;

/// Accepts lowercase kebab-case only, so a slug can never name anything outside the post table.
pub fn validate_slug(slug: &str) -> Result<(), PostError> {
    let is_valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if is_valid {
        Ok(())
    } else {
        Err(PostError::InvalidSlug(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_slug;

    #[test]
    fn accepts_kebab_case() {
        assert!(validate_slug("hello-world").is_ok());
        assert!(validate_slug("ai-feb-2026").is_ok());
        assert!(validate_slug("x").is_ok());
    }

    #[test]
    fn rejects_everything_else() {
        for slug in ["", "-a", "a-", "a--b", "Hello", "../etc/passwd", "a/b", "a.md", "caf\u{e9}"] {
            assert!(validate_slug(slug).is_err(), "{slug:?} should be rejected");
        }
    }
}
