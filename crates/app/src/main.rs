use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "campus_risk={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let server_settings = &settings.server;
    let db = parse_database(&server_settings.database).await?;

    let mut builder = engine::Engine::builder()
        .database(db)
        .limits(settings.risk.limits()?)
        .pagination((&settings.pagination).into());
    if let Some(timeout) = settings.risk.query_timeout() {
        builder = builder.query_timeout(timeout);
    }
    let engine = builder.build().await?;

    let seeded = engine.seed_reference_values().await?;
    tracing::info!("{} reference values available", seeded.len());

    let bind = server_settings.bind.as_deref().unwrap_or("127.0.0.1");
    let addr = format!("{}:{}", bind, server_settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tokio::select! {
        result = server::run_with_listener(engine, listener) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
