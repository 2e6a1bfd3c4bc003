//! Database connection helpers.

use log::{debug, info};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Open a pooled connection described by `config`.
///
/// In-memory SQLite databases live and die with their connection, so the
/// pool is pinned to exactly one connection for them.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(config.sqlx_logging)
        .sqlx_logging_level(log::LevelFilter::Debug);

    if config.is_in_memory() {
        options.max_connections(1).min_connections(1);
    }

    let conn = Database::connect(options).await?;
    info!("Connected to {}", config.url);
    Ok(conn)
}

/// Create the table for `entity` unless it already exists.
pub async fn create_table<C, E>(conn: &C, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    let statement = backend.build(&statement);
    debug!("{}", statement);
    conn.execute(statement).await?;
    Ok(())
}
