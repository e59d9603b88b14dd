//! Game constants shared by the server and the client controller.

/// Words drawn for one duel or solo session.
pub const WORDS_PER_DUEL: usize = 30;

/// Countdown per word before the host advances scorelessly.
pub const SECONDS_PER_WORD: i64 = 30;

/// Fixed award for answering a word first, independent of player and word.
pub const POINTS_PER_WORD: i32 = 10;

/// Tier quota cap in the selector: easy and medium never exceed this many
/// words, whatever the session size.
pub const TIER_QUOTA_CAP: usize = 10;

/// Local pre-game countdown shown between `waiting -> playing` and the
/// first word.
pub const COUNTDOWN_SECONDS: u32 = 3;

/// How long a client keeps showing the answered word before presenting the
/// next one. Display-only; the authoritative row advances immediately.
pub const CELEBRATION_SECONDS: i64 = 2;

/// Fallback poll interval when push delivery is silent.
pub const POLL_INTERVAL_SECONDS: u64 = 2;

/// How long the "other player is typing" indicator stays lit after the most
/// recent signal.
pub const TYPING_WINDOW_MILLIS: i64 = 1000;

/// Hints per word: the authored hint, then the first-letter hint.
pub const HINTS_PER_WORD: usize = 2;

/// Per-hint penalty in solo scoring.
pub const SOLO_HINT_PENALTY: i32 = 3;
