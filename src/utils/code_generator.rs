//! Short code generation.
//!
//! Codes are drawn uniformly from the 62-symbol alphabet `a-zA-Z0-9` using the
//! operating system CSPRNG. Uniqueness is not guaranteed here; the caller checks
//! the store and retries within its own budget.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Alphabet used for generated codes.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Largest multiple of the alphabet size that fits in a byte (4 * 62).
/// Bytes at or above this are rejected to avoid modulo bias.
const REJECTION_BOUND: u8 = 248;

/// Generates a random short code of `length` characters.
///
/// Uses `getrandom` for entropy with rejection sampling. If the OS source is
/// unavailable, falls back to a time-seeded [`StdRng`]. That fallback has far
/// less entropy and is only there so code allocation never fails outright.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    match generate_secure(length) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!(error = %e, "OS random source failed, using fallback code generator");
            generate_fallback(length)
        }
    }
}

fn generate_secure(length: usize) -> Result<String, getrandom::Error> {
    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 32];

    while code.len() < length {
        getrandom::fill(&mut buffer)?;

        for &byte in &buffer {
            if byte >= REJECTION_BOUND {
                continue;
            }
            code.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);
            if code.len() == length {
                break;
            }
        }
    }

    Ok(code)
}

fn generate_fallback(length: usize) -> String {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed);

    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
