use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{attempts, prelude::*};
use crate::repositories::RepoError;
use duel_types::{Attempt, RoomId};

/// Read/append access to the append-only guess log. Correct guesses are
/// inserted by the room repository inside its advance transaction; this
/// repository serves everything else.
pub struct AttemptRepository {
    db: DatabaseConnection,
}

impl AttemptRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, attempt: &Attempt) -> Result<(), RepoError> {
        Attempts::insert(attempts::ActiveModel::from(attempt))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// All attempts for a room, oldest first.
    pub async fn list_for_room(&self, room_id: RoomId) -> Result<Vec<Attempt>, RepoError> {
        let models = Attempts::find()
            .filter(attempts::Column::RoomId.eq(room_id))
            .order_by_asc(attempts::Column::SubmittedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Attempt::from).collect())
    }

    /// Attempts for one word position in a room, oldest first.
    pub async fn list_for_word(
        &self,
        room_id: RoomId,
        word_index: i32,
    ) -> Result<Vec<Attempt>, RepoError> {
        let models = Attempts::find()
            .filter(attempts::Column::RoomId.eq(room_id))
            .filter(attempts::Column::WordIndex.eq(word_index))
            .order_by_asc(attempts::Column::SubmittedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Attempt::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::RoomRepository;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use duel_types::PlayerInfo;
    use uuid::Uuid;

    async fn setup() -> (RoomRepository, AttemptRepository) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (RoomRepository::new(db.clone()), AttemptRepository::new(db))
    }

    fn player(name: &str) -> PlayerInfo {
        PlayerInfo {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (rooms, attempts) = setup().await;
        let host = player("דנה");
        let room = rooms
            .create_room(&host, vec!["שלג".to_string(), "ים".to_string()])
            .await
            .unwrap();

        for (index, guess) in [(0, "חול"), (0, "קרח"), (1, "מים")] {
            let attempt = Attempt::new(
                room.id,
                host.id,
                index,
                guess.to_string(),
                false,
                Utc::now(),
            );
            attempts.insert(&attempt).await.unwrap();
        }

        let all = attempts.list_for_room(room.id).await.unwrap();
        assert_eq!(all.len(), 3);

        let word_zero = attempts.list_for_word(room.id, 0).await.unwrap();
        assert_eq!(word_zero.len(), 2);
        assert!(word_zero.iter().all(|a| a.word_index == 0));
        assert!(word_zero.iter().all(|a| !a.is_correct));
    }

    #[tokio::test]
    async fn test_empty_room_has_no_attempts() {
        let (rooms, attempts) = setup().await;
        let room = rooms
            .create_room(&player("דנה"), vec!["שלג".to_string()])
            .await
            .unwrap();

        assert!(attempts.list_for_room(room.id).await.unwrap().is_empty());
    }
}
