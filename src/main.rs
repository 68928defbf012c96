use dotenvy::dotenv;
use product_tracker::{
    config::{catalog, database},
    context::TrackerContext,
    errors::Result,
};
use std::{env, path::Path};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let ctx = TrackerContext::new(db);

    // 4. Seed the catalog: CATALOG_PATH if set, else ./config.toml when present
    let config = match env::var("CATALOG_PATH") {
        Ok(path) => Some(catalog::load_catalog(path)?),
        Err(_) if Path::new(catalog::DEFAULT_CATALOG_PATH).exists() => {
            Some(catalog::load_default_catalog()?)
        }
        Err(_) => None,
    };
    match config {
        Some(config) => {
            catalog::seed_catalog(&ctx, &config)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
        }
        None => info!("No catalog file, skipping seed"),
    }

    // 5. One line per period
    for record in ctx.month_records.list_all().await? {
        let products = ctx.products.list_by_month_record(record.id).await?;
        info!(
            id = record.id,
            name = %record.name,
            is_active = record.is_active,
            is_locked = record.is_locked,
            products = products.len(),
            "Month record"
        );
    }

    Ok(())
}
