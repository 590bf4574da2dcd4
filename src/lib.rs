//! Thanos Snap - an image drop zone that makes images vanish.
//!
//! Users drop or pick one image, it is uploaded to a small storage service and
//! shown on the page. Deleting it plays a dust-like dissolve (an SVG
//! displacement filter driven by [`snap_fx`]) before the stored file is
//! removed.
//!
//! Everything except the `wasm` entry point and `widget` is plain Rust and runs in native
//! tests: the DOM layer feeds events into a [`controller::Controller`] and
//! carries out the [`controller::Effect`]s it returns.

pub mod api;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod gate;
pub mod selection;
pub mod session;
pub mod status;
pub mod theme;

#[cfg(test)]
mod tests;

// WASM entry point and DOM binding
#[cfg(target_arch = "wasm32")]
pub mod widget;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
