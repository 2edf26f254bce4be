//! Configuration types for building a cat card.
//!
//! All run behaviour is controlled through [`CardConfig`], built via its
//! [`CardConfigBuilder`]. The defaults mirror the public service's sensible
//! values (two 400×500 panels, pink 100 px captions saying "Hello" / "You")
//! so `CardConfig::default()` produces a working card with no setup.

use crate::diagnostics::Observer;
use crate::error::CardError;
use crate::pipeline::compose::{canvas_bytes, MAX_CANVAS_BYTES};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base locator of the public cat-as-a-service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://cataas.com/cat";

/// Rendering parameters shared by both panels.
///
/// Every field is forwarded to the image service as a query parameter, in
/// declaration order: `width`, `height`, `size`, `color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Panel width in pixels. Default: 400.
    pub width: u32,
    /// Panel height in pixels. Default: 500.
    pub height: u32,
    /// Caption font size. Default: 100.
    pub size: u32,
    /// Caption colour, any value the service understands. Default: "Pink".
    pub color: String,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            width: 400,
            height: 500,
            size: 100,
            color: "Pink".to_string(),
        }
    }
}

impl RenderParams {
    /// Query parameters in their fixed enumeration order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("size", self.size.to_string()),
            ("color", self.color.clone()),
        ]
    }

    /// Width of the two-panel canvas.
    pub fn canvas_width(&self) -> u32 {
        self.width.saturating_mul(2)
    }
}

/// Encoding of the composed card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Baseline JPEG (default). Alpha is flattened onto the background.
    #[default]
    Jpeg,
    /// Lossless PNG with alpha preserved.
    Png,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two caption positions in the card: 0 is left, 1 is right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionSlot {
    pub text: String,
    pub index: usize,
}

impl CaptionSlot {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }
}

/// Configuration for a cat-card run.
///
/// Built via [`CardConfig::builder()`] or using [`CardConfig::default()`].
///
/// # Example
/// ```rust
/// use cat_card::{CardConfig, OutputFormat};
///
/// let config = CardConfig::builder()
///     .greeting("Good")
///     .who("Morning")
///     .width(300)
///     .format(OutputFormat::Png)
///     .build()
///     .unwrap();
/// assert_eq!(config.params.width, 300);
/// ```
#[derive(Clone)]
pub struct CardConfig {
    /// Caption of the left panel. Default: "Hello".
    pub greeting: String,

    /// Caption of the right panel. Default: "You".
    pub who: String,

    /// Panel size and caption styling.
    pub params: RenderParams,

    /// Encoding of the composed card. Default: [`OutputFormat::Jpeg`].
    pub format: OutputFormat,

    /// Service base locator; captions are appended as `/says/<text>`.
    /// Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Fetch both panels at the same time instead of one after the other.
    /// Default: false.
    ///
    /// Placement is always decided by slot index, so the card looks the same
    /// either way; only wall-clock time changes.
    pub concurrent_fetch: bool,

    /// Per-request timeout in seconds. Default: None (transport default).
    pub request_timeout_secs: Option<u64>,

    /// Receives a [`crate::diagnostics::Diagnostic`] for every pipeline step.
    pub observer: Option<Observer>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
            who: "You".to_string(),
            params: RenderParams::default(),
            format: OutputFormat::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrent_fetch: false,
            request_timeout_secs: None,
            observer: None,
        }
    }
}

impl fmt::Debug for CardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardConfig")
            .field("greeting", &self.greeting)
            .field("who", &self.who)
            .field("params", &self.params)
            .field("format", &self.format)
            .field("base_url", &self.base_url)
            .field("concurrent_fetch", &self.concurrent_fetch)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("observer", &self.observer.as_ref().map(|_| "<dyn DiagnosticObserver>"))
            .finish()
    }
}

impl CardConfig {
    /// Create a new builder for `CardConfig`.
    pub fn builder() -> CardConfigBuilder {
        CardConfigBuilder {
            config: Self::default(),
        }
    }

    /// The two caption slots, left then right.
    pub fn slots(&self) -> Vec<CaptionSlot> {
        vec![
            CaptionSlot::new(0, self.greeting.clone()),
            CaptionSlot::new(1, self.who.clone()),
        ]
    }

    /// Parse [`CardConfig::base_url`], rejecting locators that cannot carry a path.
    pub fn parsed_base_url(&self) -> Result<Url, CardError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            CardError::InvalidConfig(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(CardError::InvalidConfig(format!(
                "Base URL must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        Ok(url)
    }
}

/// Builder for [`CardConfig`].
#[derive(Debug)]
pub struct CardConfigBuilder {
    config: CardConfig,
}

impl CardConfigBuilder {
    pub fn greeting(mut self, text: impl Into<String>) -> Self {
        self.config.greeting = text.into();
        self
    }

    pub fn who(mut self, text: impl Into<String>) -> Self {
        self.config.who = text.into();
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.config.params.width = px.max(1);
        self
    }

    pub fn height(mut self, px: u32) -> Self {
        self.config.params.height = px.max(1);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.config.params.size = size.max(1);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.config.params.color = color.into();
        self
    }

    pub fn params(mut self, params: RenderParams) -> Self {
        self.config.params = params;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn concurrent_fetch(mut self, v: bool) -> Self {
        self.config.concurrent_fetch = v;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CardConfig, CardError> {
        let c = &self.config;
        let p = &c.params;
        if p.width == 0 || p.height == 0 || p.size == 0 {
            return Err(CardError::InvalidConfig(format!(
                "width, height and size must be ≥ 1, got {}x{} size {}",
                p.width, p.height, p.size
            )));
        }
        if p.width > u32::MAX / 2 {
            return Err(CardError::InvalidConfig(format!(
                "Width {} is too large for a two-panel canvas",
                p.width
            )));
        }
        match canvas_bytes(p.canvas_width(), p.height) {
            Some(bytes) if bytes <= MAX_CANVAS_BYTES => {}
            _ => {
                return Err(CardError::InvalidConfig(format!(
                    "Card of {}x{} px exceeds the {} MiB canvas limit",
                    p.canvas_width(),
                    p.height,
                    MAX_CANVAS_BYTES / (1024 * 1024)
                )))
            }
        }
        if p.color.trim().is_empty() {
            return Err(CardError::InvalidConfig("Color must not be empty".into()));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(CardError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        c.parsed_base_url()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_defaults() {
        let c = CardConfig::default();
        assert_eq!(c.greeting, "Hello");
        assert_eq!(c.who, "You");
        assert_eq!(c.params.width, 400);
        assert_eq!(c.params.height, 500);
        assert_eq!(c.params.size, 100);
        assert_eq!(c.params.color, "Pink");
        assert_eq!(c.format, OutputFormat::Jpeg);
        assert!(!c.concurrent_fetch);
    }

    #[test]
    fn query_pairs_keep_order() {
        let keys: Vec<&str> = RenderParams::default()
            .query_pairs()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["width", "height", "size", "color"]);
    }

    #[test]
    fn slots_are_greeting_then_who() {
        let c = CardConfig::builder().greeting("Hi").who("There").build().unwrap();
        let slots = c.slots();
        assert_eq!(slots[0], CaptionSlot::new(0, "Hi"));
        assert_eq!(slots[1], CaptionSlot::new(1, "There"));
    }

    #[test]
    fn builder_clamps_zero_dimensions() {
        let c = CardConfig::builder().width(0).height(0).size(0).build().unwrap();
        assert_eq!(c.params.width, 1);
        assert_eq!(c.params.height, 1);
        assert_eq!(c.params.size, 1);
    }

    #[test]
    fn build_rejects_bad_base_url() {
        let err = CardConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, CardError::InvalidConfig(_)));

        let err = CardConfig::builder().base_url("mailto:cat@example.com").build().unwrap_err();
        assert!(matches!(err, CardError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_overflowing_width() {
        let err = CardConfig::builder().width(u32::MAX).build().unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn build_rejects_canvas_over_limit() {
        let err = CardConfig::builder()
            .width(u32::MAX / 2)
            .height(u32::MAX)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("canvas limit"), "got: {err}");

        assert!(CardConfig::builder().width(30_000).height(30_000).build().is_err());
        assert!(CardConfig::builder().width(4000).height(4000).build().is_ok());
    }

    #[test]
    fn build_rejects_empty_color_and_zero_timeout() {
        assert!(CardConfig::builder().color("  ").build().is_err());
        assert!(CardConfig::builder().request_timeout_secs(0).build().is_err());
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::Jpeg.to_string(), "jpeg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.image_format(), image::ImageFormat::Png);
    }
}
