mod feature;
mod index;
mod registry;

pub use feature::{derive_suburb, slug, CatchmentFeature};
pub use index::{CentroidEntry, CentroidIndex};
pub use registry::{CatchmentDataset, CatchmentRegistry, Resolved};
