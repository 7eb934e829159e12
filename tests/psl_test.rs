//! Public Suffix List (PSL) integration tests.

use cookiewarden::cookies::psl::{is_public_suffix, is_valid_cookie_domain, upper_domain};

#[test]
fn test_tld_is_public_suffix() {
    assert!(is_public_suffix("com"));
    assert!(is_public_suffix("org"));
    assert!(is_public_suffix("co.uk"));
    assert!(is_public_suffix("com.au"));
    assert!(is_public_suffix("github.io"));
}

#[test]
fn test_domain_not_public_suffix() {
    assert!(!is_public_suffix("example.com"));
    assert!(!is_public_suffix("bbc.co.uk"));
    assert!(!is_public_suffix("user.github.io"));
}

#[test]
fn test_upper_domain_for_common_hosts() {
    assert_eq!(upper_domain("www.example.com"), "example.com");
    assert_eq!(upper_domain("shop.eu.example.com"), "eu.example.com");
    assert_eq!(upper_domain("www.bbc.co.uk"), "bbc.co.uk");
    assert_eq!(upper_domain("user.github.io"), "user.github.io");
}

#[test]
fn test_upper_domain_is_case_insensitive() {
    assert_eq!(upper_domain("WWW.Example.COM"), "example.com");
}

#[test]
fn test_cookie_domain_validation() {
    assert!(is_valid_cookie_domain("example.com", "example.com"));
    assert!(is_valid_cookie_domain("example.com", "sub.example.com"));
    assert!(!is_valid_cookie_domain(".com", "example.com"));
    assert!(!is_valid_cookie_domain("other.com", "example.com"));
}

#[test]
fn test_supercookie_prevention() {
    assert!(!is_valid_cookie_domain("example.com", ".com"));
    assert!(!is_valid_cookie_domain("co.uk", "example.co.uk"));
    assert!(!is_valid_cookie_domain("github.io", "user.github.io"));
}
