//! Human-shareable room codes.

use rand::Rng;

/// 32 symbols; 0/O and 1/I are excluded so codes survive being read aloud
/// or copied by hand.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ROOM_CODE_LEN: usize = 5;

/// Generate a candidate room code. Uniqueness is enforced at insert time;
/// callers regenerate on collision.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize user-entered codes: joiners type lowercase and stray spaces.
pub fn normalize_room_code(input: &str) -> String {
    input.trim().to_uppercase()
}
