//! Mockup orchestrator
//!
//! Runs the pipeline for product variants:
//!
//! ```text
//! template ─┐
//!           ├─> tint ─> composite ─> encode ─> publish ─> MockupResult
//! download ─┘
//! ```
//!
//! Every failure ends in [`MockupResult::Skipped`] plus a log line naming the
//! stage and the color/design pair. A missing mockup must never stop the
//! product or variant from being saved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::config::MockupSettings;
use crate::domain::{
    ColorSpec, CompositingRequest, DesignPlacement, MockupResult, PublishedMockup, SkipReason,
    VariantMockup, VariantMockupRequest,
};
use crate::storage::ObjectStore;

use super::compositor::Compositor;
use super::design::decode_design;
use super::encoder::EncodeError;
use super::error::MockupError;
use super::publisher::{EncodedMockup, Publisher};
use super::source::ImageSource;
use super::template::BaseTemplate;
use super::tint::{tint_color, tint_image, TintSettings};

/// Generates and publishes mockups
pub struct MockupGenerator {
    template: Arc<BaseTemplate>,
    source: Arc<dyn ImageSource>,
    publisher: Publisher,
    compositor: Compositor,
    tint: TintSettings,
    /// Bounds simultaneous pipelines (downloads, image work, uploads)
    limiter: Semaphore,
}

impl MockupGenerator {
    /// Create a generator from settings and its collaborators
    pub fn new(
        settings: &MockupSettings,
        template: Arc<BaseTemplate>,
        source: Arc<dyn ImageSource>,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, EncodeError> {
        let format = settings.output_format()?;
        let publisher = Publisher::new(store, format, Duration::from_secs(settings.upload_timeout_secs));

        Ok(MockupGenerator {
            template,
            source,
            publisher,
            compositor: Compositor::new(DesignPlacement::from(settings), settings.design_blend_mode),
            tint: TintSettings::from(settings),
            limiter: Semaphore::new(settings.max_concurrency.max(1)),
        })
    }

    pub fn template(&self) -> &BaseTemplate {
        &self.template
    }

    /// Generate one mockup. Never fails: problems become
    /// [`MockupResult::Skipped`].
    #[instrument(skip(self, request), fields(design_url = %request.design_url, color = %request.color_hex))]
    pub async fn generate_mockup(&self, request: &CompositingRequest) -> MockupResult {
        if !request.is_complete() {
            debug!("Mockup skipped: design URL and color are both required");
            return MockupResult::Skipped(SkipReason::MissingInput);
        }

        let _permit = self.limiter.acquire().await.ok();
        let start = Instant::now();

        match self.run_pipeline(request).await {
            Ok(mockup) => {
                info!(
                    key = %mockup.key,
                    width = mockup.width,
                    height = mockup.height,
                    bytes = mockup.size_bytes,
                    generation_time_ms = start.elapsed().as_millis() as u64,
                    "Mockup generated"
                );
                MockupResult::Generated(mockup)
            }
            Err(e) => {
                let reason = e.skip_reason();
                warn!(
                    stage = %reason,
                    error = %e,
                    design_url = %request.design_url,
                    color = %request.color_hex,
                    "Mockup generation failed, variant will have no mockup"
                );
                MockupResult::Skipped(reason)
            }
        }
    }

    /// Generate mockups for a product's variants.
    ///
    /// Variants sharing a color (e.g. sizes of one color) share a single
    /// mockup. Distinct colors run concurrently up to the configured limit.
    /// Results come back in input order.
    #[instrument(skip(self, variants), fields(design_url = %design_url, variants = variants.len()))]
    pub async fn generate_for_variants(
        &self,
        design_url: &str,
        variants: &[VariantMockupRequest],
    ) -> Vec<VariantMockup> {
        let mut distinct: Vec<(String, String)> = Vec::new();
        for variant in variants {
            let key = color_key(&variant.color_hex);
            if !distinct.iter().any(|(existing, _)| *existing == key) {
                distinct.push((key, variant.color_hex.clone()));
            }
        }

        let results = join_all(distinct.iter().map(|(key, color_hex)| async move {
            let request = CompositingRequest::new(design_url, color_hex.as_str());
            (key.clone(), self.generate_mockup(&request).await)
        }))
        .await;

        let by_color: HashMap<String, MockupResult> = results.into_iter().collect();

        let generated = by_color.values().filter(|r| r.is_generated()).count();
        info!(
            colors = by_color.len(),
            generated,
            skipped = by_color.len() - generated,
            "Variant mockups complete"
        );

        variants
            .iter()
            .map(|variant| VariantMockup {
                variant_id: variant.variant_id.clone(),
                mockup: by_color
                    .get(&color_key(&variant.color_hex))
                    .cloned()
                    .unwrap_or(MockupResult::Skipped(SkipReason::Internal)),
            })
            .collect()
    }

    async fn run_pipeline(&self, request: &CompositingRequest) -> Result<PublishedMockup, MockupError> {
        let base = self.template.get().await?;
        let design_bytes = self.source.download_image(&request.design_url).await?;

        let color = tint_color(&request.color_hex).map(|color| color.rgb());

        let compositor = self.compositor;
        let tint = self.tint;
        let format = self.publisher.format();

        // Tint, composite and encode are CPU work; keep them off the async workers
        let encoded = tokio::task::spawn_blocking(move || -> Result<EncodedMockup, MockupError> {
            let design = decode_design(&design_bytes)?;

            let mut garment = (*base).clone();
            if let Some(rgb) = color {
                tint_image(&mut garment, rgb, &tint);
            }
            compositor.composite_image(&mut garment, &design);

            Ok(Publisher::encode(format, &garment)?)
        })
        .await
        .map_err(|e| MockupError::Worker(e.to_string()))??;

        self.publisher.publish(encoded).await
    }
}

/// Grouping key for variants: the canonical hex for valid colors, the
/// trimmed raw value otherwise
fn color_key(color_hex: &str) -> String {
    ColorSpec::parse(color_hex)
        .map(|color| color.hex().to_string())
        .unwrap_or_else(|_| color_hex.trim().to_string())
}
