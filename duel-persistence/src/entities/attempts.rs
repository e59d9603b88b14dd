use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub word_index: i32,
    pub guess: String,
    pub is_correct: bool,
    pub submitted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id"
    )]
    Room,
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&duel_types::Attempt> for ActiveModel {
    fn from(attempt: &duel_types::Attempt) -> Self {
        use sea_orm::Set;
        Self {
            id: Set(attempt.id),
            room_id: Set(attempt.room_id),
            player_id: Set(attempt.player_id),
            word_index: Set(attempt.word_index),
            guess: Set(attempt.guess.clone()),
            is_correct: Set(attempt.is_correct),
            submitted_at: Set(attempt.submitted_at.into()),
        }
    }
}

impl From<Model> for duel_types::Attempt {
    fn from(model: Model) -> Self {
        use chrono::Utc;
        Self {
            id: model.id,
            room_id: model.room_id,
            player_id: model.player_id,
            word_index: model.word_index,
            guess: model.guess,
            is_correct: model.is_correct,
            submitted_at: model.submitted_at.with_timezone(&Utc),
        }
    }
}
