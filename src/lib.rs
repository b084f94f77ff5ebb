//! vplyer - playback core of the vPlyer streaming client.
//!
//! Normalizes backend renditions into a source catalog, drives a
//! playback session (quality/provider switching, resumable positions,
//! processing polls), and projects optimistic UI state for likes and
//! subscriptions. Everything durable lives behind the REST backend; this
//! crate is rendering-host-agnostic client logic.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod player;
pub mod reactions;
pub mod store;

pub use error::{Error, Result};
