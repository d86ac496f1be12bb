//! todo-pdf: linked todo-list planners with dot-grid detail pages.
//!
//! A [`Configuration`] is resolved (auto-scaled and clamped) by
//! [`scaling::resolve`], laid out into a [`layout::DocumentPlan`] and drawn
//! by [`render::render_plan`]. Configurations can be saved, shared as codes
//! and published to a local gallery; [`web`] serves all of it to a browser.

pub mod config;
pub mod error;
pub mod gallery;
pub mod layout;
pub mod metrics;
pub mod presets;
pub mod render;
pub mod scaling;
pub mod share;
pub mod store;
pub mod web;

pub use config::Configuration;
pub use error::AppError;
pub use render::{generate_pdf, generate_preview, GeneratedPdf};
pub use scaling::{resolve, ResolvedLayout, Warning};
