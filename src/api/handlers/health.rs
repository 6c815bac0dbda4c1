//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the base garment template is decoded and cached
    pub template_loaded: bool,
    pub template_path: String,
    pub output_format: String,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let template = state.generator.template();
    let template_loaded = template.is_loaded();

    HttpResponse::Ok().json(HealthResponse {
        // Without a template every request is skipped, but the service still answers
        status: if template_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        template_loaded,
        template_path: template.path().display().to_string(),
        output_format: state.settings.mockup.output_format.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{test, App};
    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::config::Settings;
    use crate::engine::{BaseTemplate, ImageSource, MockupError, MockupGenerator};
    use crate::storage::MemoryStore;

    struct NoDesigns;

    #[async_trait]
    impl ImageSource for NoDesigns {
        async fn download_image(&self, url: &str) -> Result<Bytes, MockupError> {
            Err(MockupError::download(url, "offline"))
        }
    }

    #[actix_web::test]
    async fn test_health_reports_unloaded_template() {
        let settings = Settings::default();
        let generator = MockupGenerator::new(
            &settings.mockup,
            Arc::new(BaseTemplate::new("assets/templates/missing-shirt.png")),
            Arc::new(NoDesigns),
            Arc::new(MemoryStore::default()),
        )
        .unwrap();
        let state = web::Data::new(AppState {
            settings,
            generator: Arc::new(generator),
        });

        let app = test::init_service(App::new().app_data(state).configure(crate::api::configure_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "degraded");
        assert_eq!(body["template_loaded"], false);
        assert_eq!(body["template_path"], "assets/templates/missing-shirt.png");
        assert_eq!(body["output_format"], "webp");
    }
}
