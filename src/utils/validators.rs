use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Ten-digit mobile number without country code, e.g. 9876543210.
pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

static AADHAAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{12}$").unwrap());

pub fn validate_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

pub fn validate_aadhaar(aadhaar: &str) -> bool {
    AADHAAR_REGEX.is_match(&aadhaar.replace(' ', ""))
}

/// `validator` hook for optional Aadhaar numbers on tenant requests.
pub fn validate_aadhaar_number(value: &str) -> Result<(), ValidationError> {
    if validate_aadhaar(value) {
        Ok(())
    } else {
        Err(ValidationError::new("aadhaar_number"))
    }
}

pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210"));
        assert!(!validate_phone("+919876543210"));
        assert!(!validate_phone("987654321"));
        assert!(!validate_phone("98765432101"));
    }

    #[test]
    fn test_validate_aadhaar() {
        assert!(validate_aadhaar("123456789012"));
        assert!(validate_aadhaar("1234 5678 9012"));
        assert!(!validate_aadhaar("12345678901"));
        assert!(validate_aadhaar_number("1234 5678 9012").is_ok());
        assert!(validate_aadhaar_number("ABCD").is_err());
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  Flat 302 "), "Flat 302");
    }
}
