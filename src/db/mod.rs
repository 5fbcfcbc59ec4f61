//! Postgres persistence for finished or checkpointed trees.

mod load;

use sqlx::PgPool;

pub use load::load_tree;

/// Create the tables and indexes if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

/// Empty every table so a tree can be reloaded from scratch.
pub async fn truncate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        "TRUNCATE kinship_edges, persons, history_entries, generation_stats",
    )
    .execute(pool)
    .await?;
    Ok(())
}
