use crate::passages;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

/// Where race paragraphs come from.
pub enum PassageSource {
    Static,
    Postgres(PgPool),
}

impl PassageSource {
    /// Connects to Postgres when a URL is given. A failed connection falls
    /// back to the built-in passages instead of refusing to start.
    pub async fn from_url(url: Option<&str>) -> Self {
        let Some(url) = url else {
            info!("passage_source = static");
            return PassageSource::Static;
        };
        match connect(url).await {
            Ok(pool) => {
                info!("passage_source = db");
                PassageSource::Postgres(pool)
            }
            Err(e) => {
                warn!("db_connect_failed = {:?}, using static passages", e);
                PassageSource::Static
            }
        }
    }

    /// A random passage from the database if available, otherwise from the
    /// built-in list.
    pub async fn random_passage(&self) -> String {
        if let PassageSource::Postgres(pool) = self {
            match sqlx::query_scalar::<_, String>(
                "SELECT text FROM passages WHERE length(text) > 0 ORDER BY random() LIMIT 1",
            )
            .fetch_one(pool)
            .await
            {
                Ok(text) => return text,
                Err(e) => warn!("db_passage_fetch_failed = {:?}", e),
            }
        }
        passages::random_passage().to_string()
    }
}

/// Connect to Postgres and make sure the passages table exists.
pub async fn connect(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS passages (
            id SERIAL PRIMARY KEY,
            text TEXT UNIQUE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
        )
        "#,
    )
    .execute(&pool)
    .await?;
    Ok(pool)
}
