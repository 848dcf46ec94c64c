//! Input validation helpers shared by the API layer

/// Validate a product SKU: 2-32 characters, uppercase alphanumeric with
/// dashes, must not start or end with a dash
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.len() < 2 || sku.len() > 32 {
        return Err("SKU must be 2-32 characters");
    }
    if !sku
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("SKU must be uppercase alphanumeric with dashes");
    }
    if sku.starts_with('-') || sku.ends_with('-') {
        return Err("SKU must not start or end with a dash");
    }
    Ok(())
}

/// Validate a warehouse or location code: 1-16 uppercase alphanumeric
/// characters with dashes
pub fn validate_entity_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() || code.len() > 16 {
        return Err("Code must be 1-16 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Code must be uppercase alphanumeric with dashes");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength: at least 8 characters with one letter and
/// one digit
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain a letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit");
    }
    Ok(())
}

/// Validate that a line-item quantity is positive
pub fn validate_quantity(qty: i64) -> Result<(), &'static str> {
    if qty > 0 {
        Ok(())
    } else {
        Err("Quantity must be positive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_rules() {
        assert!(validate_sku("SR-100").is_ok());
        assert!(validate_sku("A1").is_ok());
        assert!(validate_sku("a-100").is_err());
        assert!(validate_sku("-SR100").is_err());
        assert!(validate_sku("S").is_err());
    }

    #[test]
    fn code_rules() {
        assert!(validate_entity_code("CW").is_ok());
        assert!(validate_entity_code("A-01-01").is_ok());
        assert!(validate_entity_code("").is_err());
        assert!(validate_entity_code("lower").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("secret123").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
    }

    #[test]
    fn quantity_rules() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }
}
