//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates a player nickname: 1 to 25 visible characters, letters, digits,
/// spaces and the `_-.` punctuation set.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 25 {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some("Nickname must be between 1 and 25 characters".into());
        return Err(err);
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-' || c == '.')
    {
        let mut err = ValidationError::new("nickname_format");
        err.message =
            Some("Nickname may only contain letters, digits, spaces and _-.".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a game pin: exactly 6 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("pin_format");
        err.message = Some("Game pin must be exactly 6 digits".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a password: at least 8 characters with one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        let mut err = ValidationError::new("password_length");
        err.message = Some("Password must be at least 8 characters".into());
        return Err(err);
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        let mut err = ValidationError::new("password_strength");
        err.message = Some("Password must contain at least one letter and one digit".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nickname_valid() {
        assert!(validate_nickname("alice").is_ok());
        assert!(validate_nickname("Player One").is_ok());
        assert!(validate_nickname("a_b-c.d").is_ok());
        assert!(validate_nickname("eloise99").is_ok());
    }

    #[test]
    fn test_validate_nickname_invalid() {
        assert!(validate_nickname("").is_err());
        assert!(validate_nickname("   ").is_err());
        assert!(validate_nickname(&"a".repeat(26)).is_err());
        assert!(validate_nickname("nope!").is_err());
        assert!(validate_nickname("<script>").is_err());
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("000000").is_ok());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("1234567").is_err());
        assert!(validate_pin("12345a").is_err());
        assert!(validate_pin("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter42").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
        assert!(validate_password("12345678").is_err());
    }
}
