//! Compare two same-sized images pixel by pixel.
//!
//! [`load`] validates and decodes inputs into [`RasterImage`]s, [`diff`]
//! classifies every pixel against a per-channel threshold and builds a
//! highlight overlay, [`compare`] wires both together with concurrent
//! decoding, and [`export`] writes the overlay out as PNG.

pub mod compare;
pub mod diff;
pub mod error;
pub mod export;
pub mod load;
pub mod raster;

pub use compare::{CompareSettings, Comparator, Comparison, Upload};
pub use diff::{DiffEngine, DiffResult, DiffStats, OverlayBuffer, diff};
pub use error::{CompareError, Side};
pub use raster::RasterImage;
