//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::handlers::{
    generate::{
        GenerateRequest, GenerateResponse, VariantMockupResponse, VariantsRequest, VariantsResponse,
    },
    health::HealthResponse,
};
use crate::domain::{PublishedMockup, SkipReason, VariantMockupRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tee Mockup API",
        version = "1.0.0",
        description = "T-shirt mockup generation for print-on-demand product variants"
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "mockups", description = "Mockup generation endpoints")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::generate::generate_mockup,
        crate::api::handlers::generate::generate_variant_mockups,
    ),
    components(
        schemas(
            HealthResponse,
            GenerateRequest,
            GenerateResponse,
            VariantsRequest,
            VariantsResponse,
            VariantMockupResponse,
            VariantMockupRequest,
            PublishedMockup,
            SkipReason,
        )
    )
)]
pub struct ApiDoc;
