//! The duel room state machine: which transitions are legal, who may
//! trigger them, and what each one does to the authoritative row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::POINTS_PER_WORD;
use duel_types::{PlayerId, PlayerInfo, Room, RoomError, RoomStatus, Seat};

/// Result of advancing past the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceOutcome {
    /// The duel moved to the word at this index with a fresh countdown.
    NextWord { index: i32 },
    /// That was the last word; the room is now finished.
    Finished,
}

/// Pure transition logic over a [`Room`] row. Persistence wraps each of
/// these in a single-row write; the methods themselves never touch a store.
pub struct RoomMachine;

impl RoomMachine {
    /// New room in `waiting` with the host in seat one and the word
    /// sequence fixed for the room's lifetime.
    pub fn create(code: String, host: &PlayerInfo, words_order: Vec<String>, now: DateTime<Utc>) -> Room {
        Room {
            id: Uuid::new_v4(),
            code,
            status: RoomStatus::Waiting,
            player1_id: host.id,
            player1_name: host.name.clone(),
            player2_id: None,
            player2_name: None,
            player1_score: 0,
            player2_score: 0,
            current_word_index: 0,
            words_order,
            word_started_at: None,
            created_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    /// Seat a second player. Legal only while `waiting` with an empty guest
    /// seat; re-joining an already-held seat is a no-op so a reconnecting
    /// player is not bounced.
    pub fn join(room: &mut Room, player: &PlayerInfo) -> Result<(), RoomError> {
        if room.seat_of(player.id).is_some() {
            return Ok(());
        }
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyStarted);
        }
        if room.player2_id.is_some() {
            return Err(RoomError::RoomFull);
        }

        room.player2_id = Some(player.id);
        room.player2_name = Some(player.name.clone());
        Ok(())
    }

    /// Host starts the match once both seats are filled. Sets the match and
    /// first-word timestamps.
    pub fn start(room: &mut Room, by: PlayerId, now: DateTime<Utc>) -> Result<(), RoomError> {
        if !room.is_host(by) {
            return Err(RoomError::NotHost);
        }
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyStarted);
        }
        if room.player2_id.is_none() {
            return Err(RoomError::MissingOpponent);
        }

        room.status = RoomStatus::Playing;
        room.started_at = Some(now);
        room.word_started_at = Some(now);
        room.current_word_index = 0;
        Ok(())
    }

    /// A correct guess from either seated player: fixed award to that
    /// player, then the word is over and the room advances (or finishes).
    pub fn apply_correct_guess(
        room: &mut Room,
        by: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, RoomError> {
        if room.status != RoomStatus::Playing {
            return Err(RoomError::NotPlaying);
        }
        let seat = room.seat_of(by).ok_or(RoomError::NotSeated)?;

        match seat {
            Seat::Host => room.player1_score += POINTS_PER_WORD,
            Seat::Guest => room.player2_score += POINTS_PER_WORD,
        }

        Ok(Self::advance(room, now))
    }

    /// Host-driven advance when the per-word countdown ran out with no
    /// correct answer. No score changes; only the host may drive this so
    /// the two clients never race to advance an unanswered word.
    pub fn advance_on_timeout(
        room: &mut Room,
        by: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, RoomError> {
        if room.status != RoomStatus::Playing {
            return Err(RoomError::NotPlaying);
        }
        if !room.is_host(by) {
            return Err(RoomError::NotHost);
        }

        Ok(Self::advance(room, now))
    }

    fn advance(room: &mut Room, now: DateTime<Utc>) -> AdvanceOutcome {
        let next = room.current_word_index + 1;
        if next < room.total_words() {
            room.current_word_index = next;
            room.word_started_at = Some(now);
            AdvanceOutcome::NextWord { index: next }
        } else {
            room.status = RoomStatus::Finished;
            room.finished_at = Some(now);
            room.word_started_at = None;
            AdvanceOutcome::Finished
        }
    }

    /// Seconds elapsed on the current word, from the server-recorded start
    /// timestamp. `None` outside of play.
    pub fn seconds_since_word_start(room: &Room, now: DateTime<Utc>) -> Option<i64> {
        let started = room.word_started_at?;
        Some((now - started).num_seconds().max(0))
    }

    /// Seconds left on the current word's countdown, clamped at zero.
    pub fn seconds_left(room: &Room, now: DateTime<Utc>, per_word: i64) -> Option<i64> {
        Self::seconds_since_word_start(room, now).map(|elapsed| (per_word - elapsed).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn host() -> PlayerInfo {
        PlayerInfo {
            id: Uuid::new_v4(),
            name: "דנה".to_string(),
        }
    }

    fn guest() -> PlayerInfo {
        PlayerInfo {
            id: Uuid::new_v4(),
            name: "יובל".to_string(),
        }
    }

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{i}")).collect()
    }

    fn playing_room(n_words: usize) -> (Room, PlayerInfo, PlayerInfo, DateTime<Utc>) {
        let host = host();
        let guest = guest();
        let now = Utc::now();
        let mut room = RoomMachine::create("AB2C3".to_string(), &host, words(n_words), now);
        RoomMachine::join(&mut room, &guest).unwrap();
        RoomMachine::start(&mut room, host.id, now).unwrap();
        (room, host, guest, now)
    }

    #[test]
    fn test_create_is_waiting() {
        let host = host();
        let room = RoomMachine::create("AB2C3".to_string(), &host, words(30), Utc::now());

        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.current_word_index, 0);
        assert_eq!(room.player1_score, 0);
        assert!(room.player2_id.is_none());
        assert!(room.word_started_at.is_none());
        assert!(room.started_at.is_none());
    }

    #[test]
    fn test_join_fills_guest_seat_once() {
        let host = host();
        let first = guest();
        let second = guest();
        let mut room = RoomMachine::create("AB2C3".to_string(), &host, words(30), Utc::now());

        RoomMachine::join(&mut room, &first).unwrap();
        assert_eq!(room.player2_id, Some(first.id));
        assert_eq!(room.player2_name.as_deref(), Some("יובל"));

        // Seat taken by someone else
        assert_eq!(RoomMachine::join(&mut room, &second), Err(RoomError::RoomFull));
        // Re-join by the seated guest is a no-op
        assert_eq!(RoomMachine::join(&mut room, &first), Ok(()));
        // So is the host "joining" their own room
        assert_eq!(RoomMachine::join(&mut room, &host), Ok(()));
        assert_eq!(room.player2_id, Some(first.id));
    }

    #[test]
    fn test_join_rejected_after_start() {
        let (mut room, _, _, _) = playing_room(30);
        let late = guest();
        assert_eq!(RoomMachine::join(&mut room, &late), Err(RoomError::AlreadyStarted));
    }

    #[test]
    fn test_start_requires_host_and_opponent() {
        let host_info = host();
        let guest_info = guest();
        let now = Utc::now();
        let mut room = RoomMachine::create("AB2C3".to_string(), &host_info, words(30), now);

        // No opponent yet
        assert_eq!(
            RoomMachine::start(&mut room, host_info.id, now),
            Err(RoomError::MissingOpponent)
        );

        RoomMachine::join(&mut room, &guest_info).unwrap();

        // Guest may not start
        assert_eq!(
            RoomMachine::start(&mut room, guest_info.id, now),
            Err(RoomError::NotHost)
        );

        RoomMachine::start(&mut room, host_info.id, now).unwrap();
        assert_eq!(room.status, RoomStatus::Playing);
        assert_eq!(room.started_at, Some(now));
        assert_eq!(room.word_started_at, Some(now));
        assert_eq!(room.current_word_index, 0);

        // Starting twice is rejected
        assert_eq!(
            RoomMachine::start(&mut room, host_info.id, now),
            Err(RoomError::AlreadyStarted)
        );
    }

    #[test]
    fn test_correct_guess_awards_and_advances() {
        let (mut room, _, guest_info, started) = playing_room(30);
        let later = started + Duration::seconds(5);

        let outcome = RoomMachine::apply_correct_guess(&mut room, guest_info.id, later).unwrap();

        assert_eq!(outcome, AdvanceOutcome::NextWord { index: 1 });
        assert_eq!(room.player2_score, 10);
        assert_eq!(room.player1_score, 0);
        assert_eq!(room.current_word_index, 1);
        assert_eq!(room.word_started_at, Some(later));
        assert_eq!(room.status, RoomStatus::Playing);
    }

    #[test]
    fn test_correct_guess_on_last_word_finishes() {
        let (mut room, host_info, _, started) = playing_room(2);
        let mid = started + Duration::seconds(4);
        let end = started + Duration::seconds(9);

        RoomMachine::apply_correct_guess(&mut room, host_info.id, mid).unwrap();
        let outcome = RoomMachine::apply_correct_guess(&mut room, host_info.id, end).unwrap();

        assert_eq!(outcome, AdvanceOutcome::Finished);
        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.finished_at, Some(end));
        assert_eq!(room.player1_score, 20);
        // Index freezes at the last word; it never reaches words_order.len()
        assert_eq!(room.current_word_index, 1);
        assert!(room.word_started_at.is_none());
    }

    #[test]
    fn test_timeout_advances_without_score() {
        let (mut room, host_info, guest_info, started) = playing_room(30);
        let later = started + Duration::seconds(31);

        // Only the host drives timeout advancement
        assert_eq!(
            RoomMachine::advance_on_timeout(&mut room, guest_info.id, later),
            Err(RoomError::NotHost)
        );

        let outcome = RoomMachine::advance_on_timeout(&mut room, host_info.id, later).unwrap();
        assert_eq!(outcome, AdvanceOutcome::NextWord { index: 1 });
        assert_eq!(room.player1_score, 0);
        assert_eq!(room.player2_score, 0);
        assert_eq!(room.word_started_at, Some(later));
    }

    #[test]
    fn test_timeout_on_last_word_finishes() {
        let (mut room, host_info, _, started) = playing_room(1);
        let later = started + Duration::seconds(31);

        let outcome = RoomMachine::advance_on_timeout(&mut room, host_info.id, later).unwrap();
        assert_eq!(outcome, AdvanceOutcome::Finished);
        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.player1_score, 0);
    }

    #[test]
    fn test_unseated_player_cannot_score() {
        let (mut room, _, _, started) = playing_room(30);
        let stranger = Uuid::new_v4();

        assert_eq!(
            RoomMachine::apply_correct_guess(&mut room, stranger, started),
            Err(RoomError::NotSeated)
        );
        assert_eq!(room.current_word_index, 0);
    }

    #[test]
    fn test_no_mutation_once_finished() {
        let (mut room, host_info, guest_info, started) = playing_room(1);
        RoomMachine::advance_on_timeout(&mut room, host_info.id, started).unwrap();
        assert_eq!(room.status, RoomStatus::Finished);

        let frozen = room.clone();
        assert_eq!(
            RoomMachine::apply_correct_guess(&mut room, guest_info.id, started),
            Err(RoomError::NotPlaying)
        );
        assert_eq!(
            RoomMachine::advance_on_timeout(&mut room, host_info.id, started),
            Err(RoomError::NotPlaying)
        );
        assert_eq!(
            RoomMachine::start(&mut room, host_info.id, started),
            Err(RoomError::AlreadyStarted)
        );
        assert_eq!(room.player1_score, frozen.player1_score);
        assert_eq!(room.current_word_index, frozen.current_word_index);
    }

    #[test]
    fn test_status_monotone_over_full_match() {
        let (mut room, host_info, _, started) = playing_room(3);
        let mut last = RoomStatus::Waiting;

        for step in 0..3i64 {
            assert!(room.status >= last);
            last = room.status;
            let at = started + Duration::seconds(30 * (step + 1));
            RoomMachine::advance_on_timeout(&mut room, host_info.id, at).unwrap();
        }
        assert_eq!(room.status, RoomStatus::Finished);
        assert!(room.status >= last);
    }

    #[test]
    fn test_seconds_left_clamped() {
        let (room, _, _, started) = playing_room(30);

        assert_eq!(RoomMachine::seconds_left(&room, started, 30), Some(30));
        assert_eq!(
            RoomMachine::seconds_left(&room, started + Duration::seconds(12), 30),
            Some(18)
        );
        assert_eq!(
            RoomMachine::seconds_left(&room, started + Duration::seconds(45), 30),
            Some(0)
        );
    }
}
