//! Session host for the two-display fog-of-war map viewer.
//!
//! DESIGN
//! ======
//! The `canvas` crate owns every pixel decision. This crate owns what sits
//! around it: the catalog of maps in a session, loading surfaces and masks
//! through an [`store::AssetStore`], and carrying the engine's persistence
//! actions to a background worker so the event loop never waits on storage.
//!
//! Window construction, file dialogs, image codecs, and monitor enumeration
//! belong to the embedding application.

pub mod config;
pub mod services;
pub mod state;
pub mod store;
