use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_address(address: &str) -> bool {
    lazy_static! {
        static ref ADDRESS_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    }
    ADDRESS_RE.is_match(address)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(is_valid_address(
            "0x52908400098527886e0f7030069857d2e4169ee7"
        ));
        assert!(is_valid_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_address("52908400098527886e0f7030069857d2e4169ee7"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xzz908400098527886e0f7030069857d2e4169ee7"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("someone@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
    }
}
