//! Tee Mockup
//!
//! HTTP service that generates t-shirt mockups for product variants using
//! Rust + Actix-Web.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use tee_mockup::api;
use tee_mockup::config::Settings;
use tee_mockup::engine::{BaseTemplate, HttpImageSource, MockupGenerator};
use tee_mockup::storage::{MemoryStore, ObjectStore, S3Store};
use tee_mockup::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("tee_mockup=info,actix_web=info"))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).json().init();

    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting Tee Mockup v{} on {}", env!("CARGO_PKG_VERSION"), bind_addr);

    let template = Arc::new(BaseTemplate::new(&settings.template.path));
    if settings.template.preload {
        // A missing template degrades to "no mockups", it does not stop the service
        if let Err(e) = template.preload().await {
            warn!(error = %e, "Base template unavailable, mockups will be skipped");
        }
    }

    let source = HttpImageSource::new(
        Duration::from_secs(settings.mockup.download_timeout_secs),
        settings.mockup.max_design_bytes,
    )
    .context("Failed to build HTTP client")?;

    let store: Arc<dyn ObjectStore> = if settings.storage.is_configured() {
        let store = S3Store::new(&settings.storage)
            .await
            .context("Failed to initialize object storage")?;
        info!(bucket = store.bucket(), "Object storage initialized");
        Arc::new(store)
    } else {
        warn!("No storage bucket configured, mockups are kept in memory only");
        Arc::new(MemoryStore::new(
            format!("http://{}/objects", bind_addr),
            settings.storage.key_prefix.clone(),
        ))
    };

    let generator = MockupGenerator::new(&settings.mockup, template, Arc::new(source), store)
        .context("Invalid mockup output settings")?;

    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    let app_state = web::Data::new(AppState {
        settings,
        generator: Arc::new(generator),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "tee-mockup"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION"))),
            )
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
