//! Mockup generation endpoints
//!
//! Generation never fails the request: a mockup that could not be produced
//! comes back as `success: false` with the stage that stopped it, and the
//! caller saves its product without a mockup.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    CompositingRequest, MockupResult, PublishedMockup, SkipReason, VariantMockup,
    VariantMockupRequest,
};
use crate::AppState;

/// Request body for single mockup generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// URL of the design image to composite
    #[serde(default)]
    pub design_url: String,
    /// Garment color, `#RRGGBB` or `#RGB`
    #[serde(default)]
    pub color_hex: String,
}

/// Response for single mockup generation
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub mockup_url: Option<String>,
    pub mockup_key: Option<String>,
    pub mockup: Option<PublishedMockup>,
    /// Stage that stopped generation, when no mockup was produced
    pub skipped_reason: Option<SkipReason>,
    pub generation_time_ms: u64,
}

/// Request body for per-variant generation
#[derive(Debug, Deserialize, ToSchema)]
pub struct VariantsRequest {
    #[serde(default)]
    pub design_url: String,
    pub variants: Vec<VariantMockupRequest>,
}

/// Mockup outcome for one variant
#[derive(Debug, Serialize, ToSchema)]
pub struct VariantMockupResponse {
    pub variant_id: String,
    pub mockup_url: Option<String>,
    pub mockup_key: Option<String>,
    pub skipped_reason: Option<SkipReason>,
}

/// Response for per-variant generation, in request order
#[derive(Debug, Serialize, ToSchema)]
pub struct VariantsResponse {
    pub generated: usize,
    pub skipped: usize,
    pub variants: Vec<VariantMockupResponse>,
    pub generation_time_ms: u64,
}

impl GenerateResponse {
    fn from_result(result: MockupResult, generation_time_ms: u64) -> Self {
        GenerateResponse {
            success: result.is_generated(),
            mockup_url: result.url().map(str::to_string),
            mockup_key: result.key().map(str::to_string),
            skipped_reason: result.skip_reason(),
            mockup: result.published().cloned(),
            generation_time_ms,
        }
    }
}

impl From<VariantMockup> for VariantMockupResponse {
    fn from(variant: VariantMockup) -> Self {
        VariantMockupResponse {
            mockup_url: variant.mockup.url().map(str::to_string),
            mockup_key: variant.mockup.key().map(str::to_string),
            skipped_reason: variant.mockup.skip_reason(),
            variant_id: variant.variant_id,
        }
    }
}

/// POST /api/v1/mockups/generate - Generate a mockup for one color
#[utoipa::path(
    post,
    path = "/api/v1/mockups/generate",
    tag = "mockups",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generation attempted; check `success`", body = GenerateResponse)
    )
)]
pub async fn generate_mockup(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> HttpResponse {
    let start = Instant::now();

    info!(
        design_url = %body.design_url,
        color = %body.color_hex,
        "Processing mockup generation request"
    );

    let body = body.into_inner();
    let request = CompositingRequest::new(body.design_url, body.color_hex);
    let result = state.generator.generate_mockup(&request).await;

    HttpResponse::Ok().json(GenerateResponse::from_result(
        result,
        start.elapsed().as_millis() as u64,
    ))
}

/// POST /api/v1/mockups/variants - Generate mockups for product variants
#[utoipa::path(
    post,
    path = "/api/v1/mockups/variants",
    tag = "mockups",
    request_body = VariantsRequest,
    responses(
        (status = 200, description = "One entry per variant, in request order", body = VariantsResponse)
    )
)]
pub async fn generate_variant_mockups(
    state: web::Data<AppState>,
    body: web::Json<VariantsRequest>,
) -> HttpResponse {
    let start = Instant::now();

    info!(
        design_url = %body.design_url,
        variants = body.variants.len(),
        "Processing variant mockup request"
    );

    let results = state
        .generator
        .generate_for_variants(&body.design_url, &body.variants)
        .await;

    let generated = results.iter().filter(|v| v.mockup.is_generated()).count();
    let skipped = results.len() - generated;

    HttpResponse::Ok().json(VariantsResponse {
        generated,
        skipped,
        variants: results.into_iter().map(VariantMockupResponse::from).collect(),
        generation_time_ms: start.elapsed().as_millis() as u64,
    })
}
