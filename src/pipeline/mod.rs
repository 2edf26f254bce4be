//! Pipeline stages for building a cat card.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the network or the imaging backend can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! request ──▶ fetch ──▶ compose ──▶ encode
//! (locator)   (HTTP)    (canvas)    (jpeg/png)
//! ```
//!
//! 1. [`request`]: caption + render parameters → service locator
//! 2. [`fetch`]:   one GET per locator; failures become `None` plus a
//!    diagnostic, never an error
//! 3. [`compose`]: paint each fetched image at its offset on a fixed-size
//!    canvas; runs in `spawn_blocking` because decoding is CPU-bound
//! 4. [`encode`]:  encode the canvas in the requested output format

pub mod compose;
pub mod encode;
pub mod fetch;
pub mod request;
