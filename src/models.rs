//! Handles of actinia resources and the data they hold.
pub(crate) mod data;
mod job;
mod layer;
mod location;
mod mapset;
mod registry;
mod strds;

pub use data::{
    InfoMap, JobState, JobUrls, Progress, ProjectionInfo, Region, ValidationOutcome,
};
pub use job::Job;
pub use layer::{Layer, LayerKind, Raster, RasterKind, Vector, VectorKind};
pub use location::Location;
pub use mapset::Mapset;
pub use registry::{job_names, JobRegistry};
pub use strds::{is_empty_dataset, SpaceTimeRasterDataset, StrdsRasterLayers};
