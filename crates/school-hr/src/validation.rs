//! Field checks shared by the intake paths.

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

pub(crate) fn require_email(field: &str, value: &str) -> Result<(), String> {
    require_text(field, value)?;
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(format!("{field} '{trimmed}' is not a valid e-mail address")),
    }
}

/// Blank optional strings are stored as absent.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_local_part_and_dotted_domain() {
        assert!(require_email("email", "hr@school.edu").is_ok());
        assert!(require_email("email", "@school.edu").is_err());
        assert!(require_email("email", "hr@localhost").is_err());
        assert!(require_email("email", "  ").is_err());
    }

    #[test]
    fn blank_optionals_collapse_to_none() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" Main St ".to_string())),
            Some("Main St".to_string())
        );
    }
}
