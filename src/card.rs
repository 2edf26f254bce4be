//! Card generation entry points and the pipeline orchestrator.
//!
//! [`Pipeline::run`] drives the stages for each caption slot in order:
//! build the locator, fetch, and (if the fetch produced bytes) place the
//! image at its panel offset. It then hands every placed image to the
//! compositor exactly once. A slot whose fetch failed is simply absent from
//! the compositor's input; there is no placeholder.
//!
//! When every fetch fails the compositor is still invoked, with an empty
//! list, and [`BlendCompositor`] answers with a blank two-panel canvas. A
//! [`Diagnostic::NoImages`] event flags the situation so callers that would
//! rather treat it as an error can do so.

use crate::config::{CaptionSlot, CardConfig, OutputFormat, RenderParams};
use crate::diagnostics::{emit, Diagnostic, Observer};
use crate::error::CardError;
use crate::output::{CardOutput, CardStats, PlacedSlot};
use crate::pipeline::compose::{BlendCompositor, CompositeSpec, Compositor, PlacedImage};
use crate::pipeline::fetch::{HttpFetcher, ImageSource};
use crate::pipeline::request::build_request_url;
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Top-left corner of the panel for slot `index`.
///
/// Panels tile horizontally: slot 0 at `(0, 0)`, slot 1 at `(width, 0)`.
pub fn placement(index: usize, params: &RenderParams) -> (u32, u32) {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    (index.saturating_mul(params.width), 0)
}

/// The wired-up pipeline: where images come from and how they are blended.
#[derive(Clone)]
pub struct Pipeline {
    base_url: Url,
    format: OutputFormat,
    source: Arc<dyn ImageSource>,
    compositor: Arc<dyn Compositor>,
    observer: Option<Observer>,
    concurrent_fetch: bool,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators.
    ///
    /// Defaults: JPEG output, sequential fetching, no observer.
    pub fn new(
        base_url: Url,
        source: Arc<dyn ImageSource>,
        compositor: Arc<dyn Compositor>,
    ) -> Self {
        Self {
            base_url,
            format: OutputFormat::default(),
            source,
            compositor,
            observer: None,
            concurrent_fetch: false,
        }
    }

    /// The production pipeline for `config`: HTTP fetcher + [`BlendCompositor`].
    pub fn from_config(config: &CardConfig) -> Result<Self, CardError> {
        let base_url = config.parsed_base_url()?;
        let fetcher = HttpFetcher::new(config.request_timeout_secs, config.observer.clone())?;

        Ok(Self::new(base_url, Arc::new(fetcher), Arc::new(BlendCompositor::default()))
            .with_format(config.format)
            .with_concurrent_fetch(config.concurrent_fetch)
            .with_observer_opt(config.observer.clone()))
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_concurrent_fetch(mut self, v: bool) -> Self {
        self.concurrent_fetch = v;
        self
    }

    pub fn with_observer(self, observer: Observer) -> Self {
        self.with_observer_opt(Some(observer))
    }

    fn with_observer_opt(mut self, observer: Option<Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Fetch every slot, place the successes and composite them.
    ///
    /// # Errors
    /// Only a compositor failure is returned; fetch failures skip their slot.
    pub async fn run(
        &self,
        slots: &[CaptionSlot],
        params: &RenderParams,
    ) -> Result<CardOutput, CardError> {
        let total_start = Instant::now();
        let query = params.query_pairs();
        let mut acc = Accumulator::with_capacity(slots.len());

        // ── Step 1: Fetch and place ──────────────────────────────────────
        let fetch_start = Instant::now();
        if self.concurrent_fetch {
            let bodies: Vec<Option<Vec<u8>>> = stream::iter(slots.iter().map(|slot| {
                let url = build_request_url(&self.base_url, &slot.text, &query);
                let source = Arc::clone(&self.source);
                async move { source.fetch(&url).await }
            }))
            .buffered(slots.len().max(1))
            .collect()
            .await;

            for (slot, body) in slots.iter().zip(bodies) {
                self.accept(slot, body, params, &mut acc);
            }
        } else {
            for slot in slots {
                let url = build_request_url(&self.base_url, &slot.text, &query);
                let body = self.source.fetch(&url).await;
                self.accept(slot, body, params, &mut acc);
            }
        }
        let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

        if acc.images.is_empty() {
            emit(self.observer.as_ref(), Diagnostic::NoImages);
        }

        // ── Step 2: Composite ────────────────────────────────────────────
        let spec = CompositeSpec::for_params(params, self.format);
        let image_count = acc.images.len();
        let compose_start = Instant::now();
        let buffer = match self.compositor.compose(acc.images, &spec).await {
            Ok(buffer) => buffer,
            Err(e) => {
                emit(
                    self.observer.as_ref(),
                    Diagnostic::ComposeFailed {
                        reason: e.to_string(),
                    },
                );
                return Err(e);
            }
        };
        let compose_duration_ms = compose_start.elapsed().as_millis() as u64;

        emit(
            self.observer.as_ref(),
            Diagnostic::Composed {
                images: image_count,
                bytes: buffer.len(),
            },
        );

        let stats = CardStats {
            slots_requested: slots.len(),
            slots_placed: acc.placed.len(),
            slots_skipped: slots.len() - acc.placed.len(),
            bytes_fetched: acc.bytes_fetched,
            output_bytes: buffer.len() as u64,
            fetch_duration_ms,
            compose_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        Ok(CardOutput {
            buffer,
            format: spec.format,
            width: spec.width,
            height: spec.height,
            placed: acc.placed,
            stats,
        })
    }

    /// Run and persist the card to `output_path`. Nothing is written when
    /// the run fails.
    pub async fn run_to_file(
        &self,
        slots: &[CaptionSlot],
        params: &RenderParams,
        output_path: impl AsRef<Path>,
    ) -> Result<CardStats, CardError> {
        let output = self.run(slots, params).await?;
        save_output(output_path, &output.buffer).await?;
        Ok(output.stats)
    }

    /// Promote one fetch result into a placed image, or record the skip.
    fn accept(
        &self,
        slot: &CaptionSlot,
        body: Option<Vec<u8>>,
        params: &RenderParams,
        acc: &mut Accumulator,
    ) {
        let Some(buffer) = body else {
            emit(
                self.observer.as_ref(),
                Diagnostic::SlotSkipped {
                    index: slot.index,
                    text: slot.text.clone(),
                },
            );
            return;
        };

        let (x, y) = placement(slot.index, params);
        emit(
            self.observer.as_ref(),
            Diagnostic::SlotPlaced {
                index: slot.index,
                x,
                y,
            },
        );

        acc.bytes_fetched += buffer.len() as u64;
        acc.placed.push(PlacedSlot {
            index: slot.index,
            text: slot.text.clone(),
            x,
            y,
            bytes: buffer.len(),
        });
        acc.images.push(PlacedImage { buffer, x, y });
    }
}

/// Images collected for the compositor, in slot order.
struct Accumulator {
    images: Vec<PlacedImage>,
    placed: Vec<PlacedSlot>,
    bytes_fetched: u64,
}

impl Accumulator {
    fn with_capacity(n: usize) -> Self {
        Self {
            images: Vec::with_capacity(n),
            placed: Vec::with_capacity(n),
            bytes_fetched: 0,
        }
    }
}

/// Build a card from `config`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(CardOutput)` even if one or both images could not be fetched
/// (check `output.stats.slots_skipped`).
///
/// # Errors
/// - [`CardError::InvalidConfig`] for a malformed base URL
/// - any compositor error (undecodable payload, encoding failure, …)
pub async fn generate(config: &CardConfig) -> Result<CardOutput, CardError> {
    info!(
        "Building card: {:?} + {:?} ({}x{} panels)",
        config.greeting, config.who, config.params.width, config.params.height
    );
    let output = Pipeline::from_config(config)?
        .run(&config.slots(), &config.params)
        .await?;
    info!(
        "Card complete: {}/{} panels, {} bytes, {}ms",
        output.stats.slots_placed,
        output.stats.slots_requested,
        output.stats.output_bytes,
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Build a card and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    config: &CardConfig,
    output_path: impl AsRef<Path>,
) -> Result<CardStats, CardError> {
    let output = generate(config).await?;
    save_output(output_path, &output.buffer).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(config: &CardConfig) -> Result<CardOutput, CardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(config))
}

/// Persist an encoded card, creating parent directories as needed.
pub async fn save_output(output_path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), CardError> {
    let path = output_path.as_ref();
    let write_err = |source| CardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_ext = match path.extension() {
        Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
        None => "tmp".to_string(),
    };
    let tmp_path = path.with_extension(tmp_ext);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
