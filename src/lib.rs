//! # cat-card
//!
//! Fetch two captioned images from a cat-as-a-service endpoint and blend
//! them side by side into a single card.
//!
//! ## Pipeline Overview
//!
//! ```text
//! [greeting, who]
//!  │
//!  ├─ 1. Request  caption + params → https://cataas.com/cat/says/<text>?width=…
//!  ├─ 2. Fetch    one GET per slot; failures are skipped, never fatal
//!  ├─ 3. Place    slot 0 → (0, 0), slot 1 → (width, 0)
//!  ├─ 4. Compose  paint onto a (2 × width) × height canvas (spawn_blocking)
//!  └─ 5. Output   encoded jpeg/png buffer + per-run stats
//! ```
//!
//! Only a compositing failure aborts a run. A slot whose image could not be
//! fetched is left blank, and every step is reported as a structured
//! [`Diagnostic`] to an optional [`DiagnosticObserver`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cat_card::{generate_to_file, CardConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CardConfig::builder()
//!         .greeting("Hello")
//!         .who("World")
//!         .build()?;
//!     let stats = generate_to_file(&config, "images/cat-card.jpg").await?;
//!     eprintln!("{}/{} panels placed", stats.slots_placed, stats.slots_requested);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cat-card` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod card;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use card::{generate, generate_sync, generate_to_file, placement, save_output, Pipeline};
pub use config::{
    CaptionSlot, CardConfig, CardConfigBuilder, OutputFormat, RenderParams, DEFAULT_BASE_URL,
};
pub use diagnostics::{Diagnostic, DiagnosticObserver, NoopObserver, Observer};
pub use error::{CardError, FetchError};
pub use output::{CardOutput, CardStats, PlacedSlot};
pub use pipeline::compose::{BlendCompositor, CompositeSpec, Compositor, PlacedImage};
pub use pipeline::fetch::{fetch_image, HttpFetcher, ImageSource};
pub use pipeline::request::build_request_url;
