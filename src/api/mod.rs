//! Backend REST API surface: wire types and the client seam.

mod client;
mod types;

pub use client::{HttpVideoApi, VideoApi};
pub use types::*;
