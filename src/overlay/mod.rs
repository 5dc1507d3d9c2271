//! Map overlay: the rendering surface abstraction and the sync layer that drives it.

mod headless;
mod surface;
mod sync;

pub use headless::{HeadlessMap, Marker};
pub use surface::{MapStyle, MapSurface, MarkerId, MarkerKind};
pub use sync::OverlaySync;
