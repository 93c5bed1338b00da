//! Password digest used for stored credentials.
//!
//! WARNING: this is an obfuscation layer, not a security control. The digest
//! is a 32-bit rolling string hash rendered in base 36: it is trivially
//! brute-forced and collisions between different passwords are possible.
//! It is kept bit-for-bit compatible with digests already present in user
//! collections, so replacing it means migrating every stored credential.

/// Fixed salt appended to every password before hashing
const SALT: &str = "flashcard-app-salt";

/// Digest a password. Pure and deterministic.
pub fn hash_password(password: &str) -> String {
    let mut hash: i32 = 0;
    for unit in password.encode_utf16().chain(SALT.encode_utf16()) {
        // hash * 31 + unit, wrapping to 32 bits
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    to_base36(hash)
}

/// True iff `password` digests to `digest`
pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}

/// Signed base-36 rendering, lowercase digits, `-` prefix for negatives
fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut magnitude = i64::from(value).unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
