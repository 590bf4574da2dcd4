//! snap_fx - the "snap" dissolve effect as plain math
//!
//! Easing curves and a timeline that turns elapsed time into displacement,
//! scale and opacity values. The crate has no browser dependency; the widget
//! samples [`DissolveTimeline`] from its frame loop and writes the values to
//! an SVG displacement filter and the image style.

mod easing;
mod error;
mod timeline;

pub use easing::Easing;
pub use error::FxError;
pub use timeline::{
    noise_seed, DissolveSettings, DissolveTimeline, Frame, VisualParams, NOISE_SEED_RANGE,
};
