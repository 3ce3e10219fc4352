//! Relay between the presentation layer and the inference API.
//!
//! [`Relay`] performs a single stateless analysis call. [`RelayService`] runs
//! it as a background task behind the [`AnalysisPort`] request/response port,
//! and [`native`] exposes the same call over native-messaging stdio framing.

pub mod api;
pub mod client;
pub mod message;
pub mod native;
pub mod prompt;
pub mod service;

pub use client::{MIN_SOURCE_LENGTH, Relay};
pub use message::{RelayRequest, RelayResponse};
pub use prompt::build_prompt;
pub use service::{AnalysisPort, RelayHandle, RelayService};
