//! Booking numbers
//!
//! `BK-<YYYYMMDD>-<8 base-36 characters>`. Uniqueness is enforced by the
//! database; callers regenerate on collision.

use jiff::{Timestamp, tz::TimeZone};
use rand::{Rng, distributions::Slice};

const PREFIX: &str = "BK";
const SUFFIX_LEN: usize = 8;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a booking number for a booking created at `now`.
#[must_use]
pub fn generate(now: Timestamp, rng: &mut impl Rng) -> String {
    let date = now.to_zoned(TimeZone::UTC).date();

    let mut number = format!(
        "{PREFIX}-{:04}{:02}{:02}-",
        date.year(),
        date.month(),
        date.day()
    );

    // The alphabet is a non-empty constant, so the distribution always exists.
    if let Ok(alphabet) = Slice::new(ALPHABET) {
        number.extend(
            rng.sample_iter(alphabet)
                .take(SUFFIX_LEN)
                .map(|&byte| char::from(byte)),
        );
    }

    number
}
