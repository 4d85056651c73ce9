pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_schools_and_users;
mod m20250301_000002_create_groups;
mod m20250301_000003_create_news_and_tasks;
mod m20250301_000004_create_files;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_schools_and_users::Migration),
            Box::new(m20250301_000002_create_groups::Migration),
            Box::new(m20250301_000003_create_news_and_tasks::Migration),
            Box::new(m20250301_000004_create_files::Migration),
        ]
    }
}
