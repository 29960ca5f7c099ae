use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the two tables the relational backend reads and writes, if absent.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id                 TEXT PRIMARY KEY,
            name               TEXT NOT NULL,
            doc_type           TEXT NOT NULL,
            content            TEXT NOT NULL,
            status             TEXT NOT NULL DEFAULT 'processing',
            job_description_id TEXT,
            uploaded_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
            created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id                 TEXT PRIMARY KEY,
            job_description_id TEXT NOT NULL,
            job_title          TEXT NOT NULL,
            status             TEXT NOT NULL DEFAULT 'processing',
            results            JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
