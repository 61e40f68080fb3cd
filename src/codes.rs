/// Redemption codes shipped with the product.
///
/// The allow-list the original launch went out with. Deployments can replace
/// it via `REDEMPTION_CODES`; see
/// [`GateConfig::from_env`](crate::server::GateConfig::from_env).
pub const DEFAULT_CODES: [&str; 3] = [
    "TEMPMAIL_PRO_2024",
    "PREMIUM_ACCESS_2024",
    "UPGRADE_NOW_2024",
];

/// Normalizes a raw redemption code: trim surrounding whitespace, uppercase.
///
/// Codes are compared in normalized form everywhere; user input like
/// `" tempmail_pro_2024 "` matches the allow-list entry.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Checks a normalized code against the default allow-list.
#[must_use]
pub fn is_default_code(code: &str) -> bool {
    DEFAULT_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize("  tempmail_pro_2024\n"), "TEMPMAIL_PRO_2024");
        assert_eq!(normalize("Premium_Access_2024"), "PREMIUM_ACCESS_2024");
    }

    #[test]
    fn test_normalize_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_default_codes_membership() {
        assert!(is_default_code("TEMPMAIL_PRO_2024"));
        assert!(is_default_code("PREMIUM_ACCESS_2024"));
        assert!(is_default_code("UPGRADE_NOW_2024"));
        assert!(!is_default_code("TEMPMAIL_PRO_2023"));
        assert!(!is_default_code(""));
    }

    #[test]
    fn test_default_codes_already_normalized() {
        for code in DEFAULT_CODES {
            assert_eq!(normalize(code), code);
        }
    }
}
