use movequote_backend::util::password::*;

#[test]
fn test_hash_and_verify() {
    let hash = PasswordUtilsImpl::hash_password("moving-day-42").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert_ne!(hash, "moving-day-42");
    assert!(PasswordUtilsImpl::verify_password("moving-day-42", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("moving-day-43", &hash).unwrap());
}

#[test]
fn test_hashes_are_salted() {
    let a = PasswordUtilsImpl::hash_password("same-password-1").unwrap();
    let b = PasswordUtilsImpl::hash_password("same-password-1").unwrap();
    assert_ne!(a, b);
    assert!(PasswordUtilsImpl::verify_password("same-password-1", &b).unwrap());
}

#[test]
fn test_verify_rejects_malformed_hash() {
    assert!(matches!(
        PasswordUtilsImpl::verify_password("whatever1", "not-a-hash"),
        Err(PasswordError::InvalidHashFormat)
    ));
}

#[test]
fn test_unicode_password_round_trips() {
    let hash = PasswordUtilsImpl::hash_password("déménagement-2026").unwrap();
    assert!(PasswordUtilsImpl::verify_password("déménagement-2026", &hash).unwrap());
}

#[test]
fn test_password_strength_rules() {
    let cases = [
        ("removals2026", true),
        ("Van4Hire!", true),
        ("short1", false),
        ("onlyletters", false),
        ("1234567890", false),
        ("", false),
    ];
    for (password, ok) in cases {
        assert_eq!(PasswordUtilsImpl::validate_password_strength(password).is_ok(), ok, "{}", password);
    }
}

#[test]
fn test_password_strength_reports_every_failure() {
    let errors = PasswordUtilsImpl::validate_password_strength("abc").unwrap_err();
    assert_eq!(errors.len(), 2);
}
