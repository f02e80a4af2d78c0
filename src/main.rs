use std::sync::Arc;

use anyhow::Result;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use jack_joias_storefront::{
    api::{chat::ChatClient, checkout_webhook::WebhookNotifier},
    app_state::AppState,
    bootstrap, config, db,
    cart::FileStorage,
    routes,
    store::{CatalogStore, MemoryStore, OrderStore, PgStore},
    swagger,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

/// Migrations embedded into the binary so a fresh database is ready on first start
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_env();
    bootstrap::init_tracing();

    let config = config::load()?;
    tracing::debug!(?config, "Loaded configuration");

    let (catalog, orders): (Arc<dyn CatalogStore>, Arc<dyn OrderStore>) = match &config.database
    {
        Some(database) => {
            tracing::info!("Running migrations...");
            let migrations_count = db::run_migrations_blocking(MIGRATIONS, &database.url).await?;
            tracing::info!("Run {} new migrations successfully", migrations_count);

            let store = Arc::new(PgStore::new(db::create_pool(&database.url).await?));
            (store.clone(), store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, products and orders are kept in memory");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let http_client = reqwest::Client::new();
    let state = AppState::new(
        catalog,
        orders,
        Arc::new(FileStorage::new(config.cart_storage_dir.clone())),
        Arc::new(WebhookNotifier::new(
            http_client.clone(),
            config.api_urls.checkout_webhook_url.clone(),
            config.webhook_policy.clone(),
        )),
        ChatClient::new(http_client, config.api_urls.chat_webhook_url.clone()),
        config.admin_token.clone(),
    );
    if state.admin_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN is not set, admin routes will refuse every request");
    }

    let (app, mut openapi) = routes::app(state);
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Jack Joias Storefront API")
        .version("1.0.0")
        .build();
    if let Some(components) = openapi.components.as_mut() {
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
    let app = app.merge(swagger::create_swagger_ui(openapi));

    tracing::info!("Bootstrapping...");
    bootstrap::serve("Storefront", &config.server, app).await
}
