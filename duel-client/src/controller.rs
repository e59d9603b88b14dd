//! Per-browser duel synchronization: mirrors the authoritative room row
//! into a local phase, reconciles timers against server timestamps, and
//! drives the host-only timeout advancement.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::api::RoomApi;
use duel_core::consts::{
    CELEBRATION_SECONDS, COUNTDOWN_SECONDS, POLL_INTERVAL_SECONDS, TYPING_WINDOW_MILLIS,
};
use duel_core::{description_tier, HintBudget, RoomMachine};
use duel_types::{
    ApiError, Attempt, PlayerInfo, Room, RoomError, RoomEvent, RoomStatus, Word, WordCatalog,
};

/// Local mirror of the room's status, plus the two client-only phases:
/// `Loading` before the first fetch and `Countdown` for the fixed visual
/// delay between `waiting -> playing` and the first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelPhase {
    Loading,
    Waiting,
    Countdown,
    Playing,
    Finished,
}

/// A guess as shown in the attempts list.
#[derive(Debug, Clone)]
pub struct AttemptView {
    pub player_name: String,
    pub guess: String,
    pub is_correct: bool,
}

/// Throttle for outgoing typing signals; one broadcast per keystroke would
/// flood the channel.
const TYPING_SEND_INTERVAL_MILLIS: i64 = 500;

pub struct DuelController {
    api: Arc<dyn RoomApi>,
    code: String,
    player: PlayerInfo,
    catalog: Arc<WordCatalog>,
    seconds_per_word: i64,

    phase: DuelPhase,
    room: Option<Room>,
    current_word: Option<Word>,
    attempts: Vec<AttemptView>,
    word_answered: bool,
    hints: HintBudget,
    terminal_error: Option<RoomError>,

    countdown_until: Option<DateTime<Utc>>,
    celebration_until: Option<DateTime<Utc>>,
    answered_word: Option<String>,
    typing_seen_at: Option<DateTime<Utc>>,
    typing_sent_at: Option<DateTime<Utc>>,
}

impl DuelController {
    pub fn new(
        api: Arc<dyn RoomApi>,
        code: impl Into<String>,
        player: PlayerInfo,
        catalog: Arc<WordCatalog>,
        seconds_per_word: i64,
    ) -> Self {
        Self {
            api,
            code: code.into(),
            player,
            catalog,
            seconds_per_word,
            phase: DuelPhase::Loading,
            room: None,
            current_word: None,
            attempts: Vec::new(),
            word_answered: false,
            hints: HintBudget::default(),
            terminal_error: None,
            countdown_until: None,
            celebration_until: None,
            answered_word: None,
            typing_seen_at: None,
            typing_sent_at: None,
        }
    }

    // --- read accessors ---

    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn terminal_error(&self) -> Option<&RoomError> {
        self.terminal_error.as_ref()
    }

    pub fn is_host(&self) -> bool {
        self.room
            .as_ref()
            .is_some_and(|room| room.is_host(self.player.id))
    }

    pub fn word_index(&self) -> i32 {
        self.room
            .as_ref()
            .map(|room| room.current_word_index)
            .unwrap_or(0)
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.current_word.as_ref()
    }

    /// Description of the current word at the tier implied by its position.
    pub fn current_description(&self) -> Option<&str> {
        let word = self.current_word.as_ref()?;
        Some(word.descriptions.for_tier(description_tier(self.word_index())))
    }

    pub fn attempts(&self) -> &[AttemptView] {
        &self.attempts
    }

    pub fn word_answered(&self) -> bool {
        self.word_answered
    }

    /// Seconds remaining for the current word, derived from the
    /// server-recorded start timestamp on every call. Local clocks and
    /// suspended tabs cannot drift this.
    pub fn time_left(&self, now: DateTime<Utc>) -> Option<i64> {
        let room = self.room.as_ref()?;
        if self.phase != DuelPhase::Playing {
            return None;
        }
        RoomMachine::seconds_left(room, now, self.seconds_per_word)
    }

    /// The just-answered word, while the celebratory pause is on screen.
    pub fn celebrating(&self, now: DateTime<Utc>) -> Option<&str> {
        let until = self.celebration_until?;
        if now < until {
            self.answered_word.as_deref()
        } else {
            None
        }
    }

    pub fn is_opponent_typing(&self, now: DateTime<Utc>) -> bool {
        self.typing_seen_at.is_some_and(|seen| {
            now.signed_duration_since(seen) < Duration::milliseconds(TYPING_WINDOW_MILLIS)
        })
    }

    pub fn revealed_hints(&self) -> &[String] {
        self.hints.revealed()
    }

    /// Reveal the next hint for the current word; refused once the word is
    /// answered or the budget is spent. Purely local state.
    pub fn reveal_hint(&mut self) -> Option<String> {
        self.hints.reveal_next().map(str::to_string)
    }

    // --- lifecycle ---

    /// First fetch after navigation. An unknown code is terminal.
    pub async fn mount(&mut self, now: DateTime<Utc>) -> Result<(), ApiError> {
        match self.api.fetch_room(&self.code).await? {
            Some(room) => {
                self.apply_room(room, now);
                Ok(())
            }
            None => {
                self.terminal_error = Some(RoomError::RoomNotFound);
                Err(RoomError::RoomNotFound.into())
            }
        }
    }

    /// Polling fallback: re-fetch the row and run it through the same
    /// derivation as push updates. Transport failures are swallowed; the
    /// next poll is the retry.
    pub async fn poll(&mut self, now: DateTime<Utc>) {
        match self.api.fetch_room(&self.code).await {
            Ok(Some(room)) => self.apply_room(room, now),
            Ok(None) => {
                self.terminal_error = Some(RoomError::RoomNotFound);
            }
            Err(e) => debug!("poll failed, retrying next interval: {e}"),
        }
    }

    /// The single "apply fresh row" function: both the push handler and
    /// the poll path feed rows through here, so phase derivation cannot
    /// diverge between delivery paths. The row always wins over local
    /// state, except that a strictly older row is ignored.
    pub fn apply_room(&mut self, fresh: Room, now: DateTime<Utc>) {
        if let Some(current) = &self.room {
            if fresh.is_superseded_by(current) {
                debug!(code = %self.code, "ignoring stale room row");
                return;
            }
        }

        let previous_phase = self.phase;
        let previous_index = self.room.as_ref().map(|r| r.current_word_index);

        match fresh.status {
            RoomStatus::Waiting => {
                self.phase = DuelPhase::Waiting;
            }
            RoomStatus::Playing => {
                if previous_phase == DuelPhase::Waiting {
                    // Observed the start; give both players the fixed
                    // pre-game countdown before the first word.
                    self.phase = DuelPhase::Countdown;
                    self.countdown_until =
                        Some(now + Duration::seconds(COUNTDOWN_SECONDS as i64));
                } else if previous_phase != DuelPhase::Countdown {
                    // Reconnection lands mid-game with no countdown.
                    self.phase = DuelPhase::Playing;
                }

                if previous_index != Some(fresh.current_word_index)
                    || self.current_word.is_none()
                {
                    self.present_word(&fresh);
                }
            }
            RoomStatus::Finished => {
                self.phase = DuelPhase::Finished;
                self.countdown_until = None;
            }
        }

        self.room = Some(fresh);
    }

    fn present_word(&mut self, room: &Room) {
        self.attempts.clear();
        self.word_answered = false;

        self.current_word = room
            .current_word()
            .and_then(|text| self.catalog.find(text))
            .cloned();

        self.hints = match &self.current_word {
            Some(word) => HintBudget::for_word(word),
            None => HintBudget::default(),
        };
    }

    /// Route one pushed event. Typing signals from this client are
    /// ignored; everything else funnels into the row/attempt state.
    pub fn handle_event(&mut self, event: RoomEvent, now: DateTime<Utc>) {
        match event {
            RoomEvent::RoomUpdated { room } => self.apply_room(room, now),
            RoomEvent::AttemptRecorded {
                attempt,
                player_name,
            } => self.record_attempt(attempt, player_name, now),
            RoomEvent::Typing { player_id } => {
                if player_id != self.player.id {
                    self.typing_seen_at = Some(now);
                }
            }
        }
    }

    fn record_attempt(&mut self, attempt: Attempt, player_name: String, now: DateTime<Utc>) {
        if attempt.word_index != self.word_index() {
            return;
        }
        // Own attempts were already recorded locally at submit time.
        if attempt.player_id == self.player.id {
            return;
        }

        if attempt.is_correct {
            self.mark_word_answered(now);
        }
        self.attempts.push(AttemptView {
            player_name,
            guess: attempt.guess,
            is_correct: attempt.is_correct,
        });
    }

    fn mark_word_answered(&mut self, now: DateTime<Utc>) {
        self.word_answered = true;
        self.hints.lock();
        self.answered_word = self
            .current_word
            .as_ref()
            .map(|word| word.word.clone());
        self.celebration_until = Some(now + Duration::seconds(CELEBRATION_SECONDS));
    }

    /// Periodic 1 s tick: finish the local countdown, and as the host,
    /// trigger the scoreless advance when the word's time is up. Non-hosts
    /// only ever display zero and wait for the row to change.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        if self.phase == DuelPhase::Countdown {
            if let Some(until) = self.countdown_until {
                if now >= until {
                    self.phase = DuelPhase::Playing;
                    self.countdown_until = None;
                }
            }
        }

        if self.phase == DuelPhase::Playing
            && self.is_host()
            && !self.word_answered
            && self.time_left(now) == Some(0)
        {
            let word_index = self.word_index();
            match self.api.advance_on_timeout(&self.code, self.player.id, word_index).await {
                Ok(room) => self.apply_room(room, now),
                // Somebody answered, or the row moved on; the next fresh
                // row sorts it out.
                Err(e) => debug!("timeout advance rejected: {e}"),
            }
        }
    }

    /// Submit a guess for the word currently on screen. On a correct
    /// answer the server's fresh row is applied immediately; a lost race
    /// just means the word was already answered. A transport failure rolls
    /// nothing back: the row is the source of truth and the next read
    /// re-derives local state.
    pub async fn submit_guess(&mut self, guess: &str, now: DateTime<Utc>) -> Result<bool, ApiError> {
        if self.phase != DuelPhase::Playing || self.word_answered || guess.trim().is_empty() {
            return Ok(false);
        }

        let word_index = self.word_index();
        match self
            .api
            .submit_guess(&self.code, self.player.id, word_index, guess)
            .await
        {
            Ok(outcome) => {
                if outcome.is_correct {
                    self.mark_word_answered(now);
                }
                self.attempts.push(AttemptView {
                    player_name: self.player.name.clone(),
                    guess: guess.trim().to_string(),
                    is_correct: outcome.is_correct,
                });
                if let Some(room) = outcome.room {
                    self.apply_room(room, now);
                }
                Ok(outcome.is_correct)
            }
            Err(ApiError::Room(RoomError::StaleWordIndex { .. })) => {
                // The opponent won the word inside this round trip.
                self.mark_word_answered(now);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Host action: start the match once the guest seat is filled.
    pub async fn start_match(&mut self, now: DateTime<Utc>) -> Result<(), ApiError> {
        let room = self.api.start_room(&self.code, self.player.id).await?;
        self.apply_room(room, now);
        Ok(())
    }

    /// Called on every local keystroke; broadcasts a throttled ephemeral
    /// typing signal. Best-effort: failures are dropped.
    pub async fn note_local_typing(&mut self, now: DateTime<Utc>) {
        let recently_sent = self.typing_sent_at.is_some_and(|sent| {
            now.signed_duration_since(sent) < Duration::milliseconds(TYPING_SEND_INTERVAL_MILLIS)
        });
        if recently_sent {
            return;
        }
        self.typing_sent_at = Some(now);
        if let Err(e) = self.api.send_typing(&self.code, self.player.id).await {
            debug!("typing signal dropped: {e}");
        }
    }

    /// Event loop: push feed, polling fallback, and the 1 s display tick.
    /// Every timer and the subscription live inside this future, so
    /// cancelling it (navigation, unmount) tears all of them down; a
    /// stray timer from an abandoned room can never write again.
    pub async fn run(
        &mut self,
        mut feed: mpsc::UnboundedReceiver<RoomEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut poll_interval =
            tokio::time::interval(std::time::Duration::from_secs(POLL_INTERVAL_SECONDS));
        let mut tick_interval = tokio::time::interval(std::time::Duration::from_secs(1));

        loop {
            tokio::select! {
                event = feed.recv() => {
                    match event {
                        Some(event) => self.handle_event(event, Utc::now()),
                        None => break,
                    }
                }
                _ = poll_interval.tick() => {
                    self.poll(Utc::now()).await;
                }
                _ = tick_interval.tick() => {
                    self.tick(Utc::now()).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }

            if self.phase == DuelPhase::Finished || self.terminal_error.is_some() {
                break;
            }
        }

        info!(code = %self.code, "duel controller stopped");
    }
}
