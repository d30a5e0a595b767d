pub mod entities;
mod comment_repository;
mod error;
mod forum_repository;
mod launch_repository;
mod profile_repository;
mod vote_repository;

pub use comment_repository::CommentRepository;
pub use error::map_db_err;
pub use forum_repository::ForumRepository;
pub use launch_repository::LaunchRepository;
pub use profile_repository::ProfileRepository;
pub use vote_repository::VoteRepository;

use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use std::time::Duration;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// `LOWER(col) LIKE '%term%'` over any of `columns`, with wildcards in `term`
/// matched literally.
pub(crate) fn contains_any<C: ColumnTrait>(columns: &[C], term: &str) -> Condition {
    let pattern = crate::domain::like_pattern(term);
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::expr(Func::lower(Expr::col(*col)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

const MIGRATIONS: &[&str] = &[
    include_str!("../../../../migrations/001_initial.sql"),
    include_str!("../../../../migrations/002_forums.sql"),
];

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Every statement is idempotent (IF NOT EXISTS), so failures here mean the
    // object is already in place.
    for statement in MIGRATIONS.iter().flat_map(|m| m.split(';')) {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        if let Err(e) = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                statement.to_string(),
            ))
            .await
        {
            tracing::debug!("Migration statement skipped: {}", e);
        }
    }

    Ok(())
}
