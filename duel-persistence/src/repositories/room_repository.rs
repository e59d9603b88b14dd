use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::entities::{attempts, prelude::*, rooms};
use duel_core::{generate_room_code, AdvanceOutcome, RoomMachine};
use duel_types::{Attempt, PlayerId, PlayerInfo, Room, RoomError, RoomStatus};

/// Bound on regenerate-and-retry when a generated code is already taken.
const CODE_INSERT_ATTEMPTS: usize = 5;

/// Grace period when validating a host's timeout-advance against the
/// server-recorded word start, so honest clients a moment early are not
/// bounced.
const TIMER_SLACK_SECONDS: i64 = 1;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("corrupt room row: {0}")]
    Corrupt(String),
}

pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_room(model: rooms::Model) -> Result<Room, RepoError> {
        let status = RoomStatus::parse(&model.status)
            .ok_or_else(|| RepoError::Corrupt(format!("unknown status {:?}", model.status)))?;
        let words_order: Vec<String> = serde_json::from_str(&model.words_order)
            .map_err(|e| RepoError::Corrupt(format!("words_order: {e}")))?;

        Ok(Room {
            id: model.id,
            code: model.code,
            status,
            player1_id: model.player1_id,
            player1_name: model.player1_name,
            player2_id: model.player2_id,
            player2_name: model.player2_name,
            player1_score: model.player1_score,
            player2_score: model.player2_score,
            current_word_index: model.current_word_index,
            words_order,
            word_started_at: model.word_started_at.map(|t| t.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            started_at: model.started_at.map(|t| t.with_timezone(&Utc)),
            finished_at: model.finished_at.map(|t| t.with_timezone(&Utc)),
        })
    }

    fn room_to_active(room: &Room) -> Result<rooms::ActiveModel, RepoError> {
        let words_order = serde_json::to_string(&room.words_order)
            .map_err(|e| RepoError::Corrupt(format!("words_order: {e}")))?;

        Ok(rooms::ActiveModel {
            id: Set(room.id),
            code: Set(room.code.clone()),
            status: Set(room.status.as_str().to_string()),
            player1_id: Set(room.player1_id),
            player1_name: Set(room.player1_name.clone()),
            player2_id: Set(room.player2_id),
            player2_name: Set(room.player2_name.clone()),
            player1_score: Set(room.player1_score),
            player2_score: Set(room.player2_score),
            current_word_index: Set(room.current_word_index),
            words_order: Set(words_order),
            word_started_at: Set(room.word_started_at.map(Into::into)),
            created_at: Set(room.created_at.into()),
            started_at: Set(room.started_at.map(Into::into)),
            finished_at: Set(room.finished_at.map(Into::into)),
        })
    }

    async fn find_model_by_code<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<Option<rooms::Model>, RepoError> {
        Ok(Rooms::find()
            .filter(rooms::Column::Code.eq(code))
            .one(conn)
            .await?)
    }

    async fn require_room<C: ConnectionTrait>(conn: &C, code: &str) -> Result<Room, RepoError> {
        let model = Self::find_model_by_code(conn, code)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        Self::model_to_room(model)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Room>, RepoError> {
        match Self::find_model_by_code(&self.db, code).await? {
            Some(model) => Ok(Some(Self::model_to_room(model)?)),
            None => Ok(None),
        }
    }

    /// Insert a room unless its code is already taken. `Ok(None)` signals a
    /// code collision; any other failure propagates.
    pub async fn try_insert(&self, room: Room) -> Result<Option<Room>, RepoError> {
        let active = Self::room_to_active(&room)?;
        match Rooms::insert(active).exec(&self.db).await {
            Ok(_) => Ok(Some(room)),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(None),
                _ => Err(e.into()),
            },
        }
    }

    /// Create a room for `host` with the given fixed word sequence. Codes
    /// are regenerated on collision a bounded number of times; the unique
    /// index on `code` is the arbiter.
    pub async fn create_room(
        &self,
        host: &PlayerInfo,
        words_order: Vec<String>,
    ) -> Result<Room, RepoError> {
        if words_order.is_empty() {
            return Err(RoomError::EmptyCatalog.into());
        }

        let mut rng = StdRng::from_os_rng();
        for _ in 0..CODE_INSERT_ATTEMPTS {
            let code = generate_room_code(&mut rng);
            let room = RoomMachine::create(code.clone(), host, words_order.clone(), Utc::now());

            if let Some(room) = self.try_insert(room).await? {
                info!(code = %room.code, host = %host.name, "room created");
                return Ok(room);
            }
            warn!(code = %code, "room code collision, regenerating");
        }

        Err(RoomError::CodeCollision.into())
    }

    /// Seat a second player. Runs in a transaction so two concurrent
    /// joiners cannot both win the seat.
    pub async fn join_room(&self, code: &str, player: &PlayerInfo) -> Result<Room, RepoError> {
        let txn = self.db.begin().await?;
        let mut room = Self::require_room(&txn, code).await?;

        RoomMachine::join(&mut room, player)?;

        Self::room_to_active(&room)?.update(&txn).await?;
        txn.commit().await?;

        info!(code = %code, player = %player.name, "player joined room");
        Ok(room)
    }

    /// Host starts the match; the first word's countdown begins at the
    /// server's clock.
    pub async fn start_room(&self, code: &str, by: PlayerId) -> Result<Room, RepoError> {
        let txn = self.db.begin().await?;
        let mut room = Self::require_room(&txn, code).await?;

        RoomMachine::start(&mut room, by, Utc::now())?;

        Self::room_to_active(&room)?.update(&txn).await?;
        txn.commit().await?;

        info!(code = %code, "match started");
        Ok(room)
    }

    /// Record a correct guess, award the fixed points, and advance the
    /// word, all in one transaction guarded on `current_word_index`. When
    /// both players answer the same word within a round trip, the second
    /// submission sees a stale index and gets no award.
    pub async fn record_correct_guess(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
        guess: &str,
    ) -> Result<(Room, Attempt, AdvanceOutcome), RepoError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let mut room = Self::require_room(&txn, code).await?;

        if room.status == RoomStatus::Playing && room.current_word_index != word_index {
            return Err(RoomError::StaleWordIndex {
                submitted: word_index,
            }
            .into());
        }

        let outcome = RoomMachine::apply_correct_guess(&mut room, by, now)?;

        let attempt = Attempt::new(room.id, by, word_index, guess.to_string(), true, now);
        Attempts::insert(attempts::ActiveModel::from(&attempt))
            .exec(&txn)
            .await?;

        Self::room_to_active(&room)?.update(&txn).await?;
        txn.commit().await?;

        info!(code = %code, word_index, ?outcome, "correct guess recorded");
        Ok((room, attempt, outcome))
    }

    /// Append an incorrect attempt; the room row is untouched and the
    /// player may retry.
    pub async fn record_incorrect_guess(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
        guess: &str,
    ) -> Result<Attempt, RepoError> {
        let room = self
            .find_by_code(code)
            .await?
            .ok_or(RoomError::RoomNotFound)?;

        if room.status != RoomStatus::Playing {
            return Err(RoomError::NotPlaying.into());
        }
        if room.seat_of(by).is_none() {
            return Err(RoomError::NotSeated.into());
        }

        let attempt = Attempt::new(room.id, by, word_index, guess.to_string(), false, Utc::now());
        Attempts::insert(attempts::ActiveModel::from(&attempt))
            .exec(&self.db)
            .await?;

        Ok(attempt)
    }

    /// Host-driven timeout advance, validated against the server-recorded
    /// word start so a skewed client clock cannot cut a word short.
    pub async fn advance_on_timeout(
        &self,
        code: &str,
        by: PlayerId,
        word_index: i32,
        per_word_seconds: i64,
    ) -> Result<(Room, AdvanceOutcome), RepoError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let mut room = Self::require_room(&txn, code).await?;

        if room.status == RoomStatus::Playing && room.current_word_index != word_index {
            return Err(RoomError::StaleWordIndex {
                submitted: word_index,
            }
            .into());
        }
        if let Some(elapsed) = RoomMachine::seconds_since_word_start(&room, now) {
            if elapsed + TIMER_SLACK_SECONDS < per_word_seconds {
                return Err(RoomError::TimerNotExpired.into());
            }
        }

        let outcome = RoomMachine::advance_on_timeout(&mut room, by, now)?;

        Self::room_to_active(&room)?.update(&txn).await?;
        txn.commit().await?;

        info!(code = %code, word_index, ?outcome, "timeout advance");
        Ok((room, outcome))
    }

    /// Drop `waiting` rooms nobody ever started. Returns how many rows went
    /// away; attempts cascade with their room.
    pub async fn delete_stale_waiting_rooms(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let result = Rooms::delete_many()
            .filter(rooms::Column::Status.eq(RoomStatus::Waiting.as_str()))
            .filter(rooms::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(count = result.rows_affected, "removed stale waiting rooms");
        }
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use uuid::Uuid;

    async fn setup_test_db() -> RoomRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        RoomRepository::new(db)
    }

    fn player(name: &str) -> PlayerInfo {
        PlayerInfo {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("מילה{i}")).collect()
    }

    fn is_room_error(err: &RepoError, expected: &RoomError) -> bool {
        matches!(err, RepoError::Room(e) if e == expected)
    }

    #[tokio::test]
    async fn test_create_and_find_room() {
        let repo = setup_test_db().await;
        let host = player("דנה");

        let room = repo.create_room(&host, words(30)).await.unwrap();
        assert_eq!(room.code.len(), 5);
        assert_eq!(room.status, RoomStatus::Waiting);

        let found = repo.find_by_code(&room.code).await.unwrap().unwrap();
        assert_eq!(found.id, room.id);
        assert_eq!(found.words_order, room.words_order);
        assert_eq!(found.player1_id, host.id);

        assert!(repo.find_by_code("ZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_room_rejects_empty_words() {
        let repo = setup_test_db().await;
        let err = repo.create_room(&player("דנה"), vec![]).await.unwrap_err();
        assert!(is_room_error(&err, &RoomError::EmptyCatalog));
    }

    #[tokio::test]
    async fn test_code_collision_detected() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let room = repo.create_room(&host, words(5)).await.unwrap();

        // Same code again: the unique index reports the collision
        let duplicate = RoomMachine::create(room.code.clone(), &player("יובל"), words(5), Utc::now());
        assert!(repo.try_insert(duplicate).await.unwrap().is_none());

        // A distinct code still inserts
        let fresh = RoomMachine::create("AAAAA".to_string(), &player("יובל"), words(5), Utc::now());
        assert!(repo.try_insert(fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_join_and_start_flow() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(30)).await.unwrap();

        let joined = repo.join_room(&room.code, &guest).await.unwrap();
        assert_eq!(joined.player2_id, Some(guest.id));

        // Third player is rejected
        let err = repo.join_room(&room.code, &player("רון")).await.unwrap_err();
        assert!(is_room_error(&err, &RoomError::RoomFull));

        let started = repo.start_room(&room.code, host.id).await.unwrap();
        assert_eq!(started.status, RoomStatus::Playing);
        assert_eq!(started.current_word_index, 0);
        assert!(started.started_at.is_some());
        assert!(started.word_started_at.is_some());

        // Joining a playing room is rejected
        let err = repo.join_room(&room.code, &player("רון")).await.unwrap_err();
        assert!(is_room_error(&err, &RoomError::AlreadyStarted));
    }

    #[tokio::test]
    async fn test_join_missing_room() {
        let repo = setup_test_db().await;
        let err = repo.join_room("ZZZZZ", &player("יובל")).await.unwrap_err();
        assert!(is_room_error(&err, &RoomError::RoomNotFound));
    }

    #[tokio::test]
    async fn test_correct_guess_awards_and_advances() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(30)).await.unwrap();
        repo.join_room(&room.code, &guest).await.unwrap();
        repo.start_room(&room.code, host.id).await.unwrap();

        let (updated, attempt, outcome) = repo
            .record_correct_guess(&room.code, guest.id, 0, "מילה0")
            .await
            .unwrap();

        assert_eq!(outcome, AdvanceOutcome::NextWord { index: 1 });
        assert_eq!(updated.player2_score, 10);
        assert_eq!(updated.player1_score, 0);
        assert_eq!(updated.current_word_index, 1);
        assert!(attempt.is_correct);
        assert_eq!(attempt.word_index, 0);
        assert_eq!(attempt.room_id, room.id);
    }

    #[tokio::test]
    async fn test_concurrent_correct_guesses_single_award() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(30)).await.unwrap();
        repo.join_room(&room.code, &guest).await.unwrap();
        repo.start_room(&room.code, host.id).await.unwrap();

        // Both clients submit a correct answer for word 0; the first write
        // advances the index, the second sees it stale.
        repo.record_correct_guess(&room.code, guest.id, 0, "מילה0")
            .await
            .unwrap();
        let err = repo
            .record_correct_guess(&room.code, host.id, 0, "מילה0")
            .await
            .unwrap_err();

        assert!(is_room_error(&err, &RoomError::StaleWordIndex { submitted: 0 }));

        let fresh = repo.find_by_code(&room.code).await.unwrap().unwrap();
        assert_eq!(fresh.player1_score, 0);
        assert_eq!(fresh.player2_score, 10);
        assert_eq!(fresh.current_word_index, 1);
    }

    #[tokio::test]
    async fn test_correct_guess_on_last_word_finishes() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(1)).await.unwrap();
        repo.join_room(&room.code, &guest).await.unwrap();
        repo.start_room(&room.code, host.id).await.unwrap();

        let (updated, _, outcome) = repo
            .record_correct_guess(&room.code, host.id, 0, "מילה0")
            .await
            .unwrap();

        assert_eq!(outcome, AdvanceOutcome::Finished);
        assert_eq!(updated.status, RoomStatus::Finished);
        assert!(updated.finished_at.is_some());
        assert_eq!(updated.current_word_index, 0);

        // The room is read-only now
        let err = repo
            .record_correct_guess(&room.code, guest.id, 0, "מילה0")
            .await
            .unwrap_err();
        assert!(is_room_error(&err, &RoomError::NotPlaying));
    }

    #[tokio::test]
    async fn test_incorrect_guess_changes_nothing() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(30)).await.unwrap();
        repo.join_room(&room.code, &guest).await.unwrap();
        repo.start_room(&room.code, host.id).await.unwrap();

        let attempt = repo
            .record_incorrect_guess(&room.code, guest.id, 0, "לא נכון")
            .await
            .unwrap();
        assert!(!attempt.is_correct);

        let fresh = repo.find_by_code(&room.code).await.unwrap().unwrap();
        assert_eq!(fresh.current_word_index, 0);
        assert_eq!(fresh.player1_score, 0);
        assert_eq!(fresh.player2_score, 0);

        // A stranger's guess is rejected
        let err = repo
            .record_incorrect_guess(&room.code, Uuid::new_v4(), 0, "ניחוש")
            .await
            .unwrap_err();
        assert!(is_room_error(&err, &RoomError::NotSeated));
    }

    #[tokio::test]
    async fn test_timeout_requires_elapsed_timer() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");
        let room = repo.create_room(&host, words(30)).await.unwrap();
        repo.join_room(&room.code, &guest).await.unwrap();
        repo.start_room(&room.code, host.id).await.unwrap();

        // The word just started; the server refuses the advance.
        let err = repo
            .advance_on_timeout(&room.code, host.id, 0, 30)
            .await
            .unwrap_err();
        assert!(is_room_error(&err, &RoomError::TimerNotExpired));

        // With a zero-length countdown it goes through, scoreless.
        let (updated, outcome) = repo
            .advance_on_timeout(&room.code, host.id, 0, 0)
            .await
            .unwrap();
        assert_eq!(outcome, AdvanceOutcome::NextWord { index: 1 });
        assert_eq!(updated.player1_score, 0);
        assert_eq!(updated.player2_score, 0);

        // Guests never drive timeouts.
        let err = repo
            .advance_on_timeout(&room.code, guest.id, 1, 0)
            .await
            .unwrap_err();
        assert!(is_room_error(&err, &RoomError::NotHost));
    }

    #[tokio::test]
    async fn test_delete_stale_waiting_rooms() {
        let repo = setup_test_db().await;
        let host = player("דנה");
        let guest = player("יובל");

        let stale = repo.create_room(&host, words(5)).await.unwrap();
        let active = repo.create_room(&host, words(5)).await.unwrap();
        repo.join_room(&active.code, &guest).await.unwrap();
        repo.start_room(&active.code, host.id).await.unwrap();

        let removed = repo
            .delete_stale_waiting_rooms(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(repo.find_by_code(&stale.code).await.unwrap().is_none());
        assert!(repo.find_by_code(&active.code).await.unwrap().is_some());
    }
}
