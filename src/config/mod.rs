// src/config/mod.rs

//! Zone description loading, validation and rendering.
//!
//! Responsibilities:
//! - Define the TOML-backed zone description (`model.rs`).
//! - Load it from disk (`loader.rs`).
//! - Validate basic invariants like unique zone names (`validate.rs`).
//! - Render the named configuration from a template (`render.rs`).
//!
//! All of this runs once, before the watcher and supervisor start.

pub mod loader;
pub mod model;
pub mod render;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RawZoneConfig, ZoneConfig, ZoneEntry, ZoneKind};
pub use render::{render_to_file, RenderContext, TemplateRenderer};
