pub use sea_orm_migration::prelude::*;

mod m20250201_000001_create_rooms_table;
mod m20250201_000002_create_attempts_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250201_000001_create_rooms_table::Migration),
            Box::new(m20250201_000002_create_attempts_table::Migration),
        ]
    }
}
