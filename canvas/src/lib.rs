//! Fog-of-war rendering and input engine for the two-display map viewer.
//!
//! This crate owns everything between a pointer event and a finished bitmap:
//! translating authoring-surface input into fog mask edits, keeping the
//! presentation pan in range, and compositing each viewport's visible region.
//! The host layer is responsible only for wiring display events to the
//! [`engine::SyncCoordinator`] and routing the resulting [`engine::Action`]s
//! to storage.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::SyncCoordinator`]: pan sync, edit transactions, gestures |
//! | [`session`] | The active map: surface, fog mask, tile spec, shared pan |
//! | [`mask`] | Fog mask raster and its edit operations |
//! | [`stroke`] | Brush stroke interpolation |
//! | [`camera`] | Screen/map coordinate conversions |
//! | [`scale`] | Physical tile scale and monitor density |
//! | [`render`] | Per-viewport compositor with render cache |
//! | [`input`] | Tools, buttons, and the gesture state machine |
//! | [`hit`] | Hit-testing against the presentation overlay |
//! | [`consts`] | Shared numeric constants (opacities, margins, defaults) |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod mask;
pub mod render;
pub mod scale;
pub mod session;
pub mod stroke;
