use sha2::{Digest, Sha256};
use time::{OffsetDateTime, UtcOffset};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_LENGTH: usize = 64;

/// Returns the lowercase hex SHA-256 digest of the UTF-8 bytes of `value`.
///
/// ```
/// use survey::hashing::sha256_hex;
/// assert_eq!(
///     sha256_hex("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn sha256_hex(value: impl AsRef<str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_ref().as_bytes());
    hex::encode(hasher.finalize())
}

/// Formats the UTC hour containing `at` as `YYYYMMDDHH`.
pub fn hour_bucket(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);

    format!(
        "{:04}{:02}{:02}{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour()
    )
}

/// Whether `value` looks like the output of [`sha256_hex`].
pub fn is_digest(value: &str) -> bool {
    value.len() == DIGEST_LENGTH && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
