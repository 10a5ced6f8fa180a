//! Endpoint paths, relative to the API root.
//!
//! | route                                                   | used by             |
//! |---------------------------------------------------------|---------------------|
//! | `locations/{location}`                                  | [crate::Location]   |
//! | `locations/{location}/mapsets/{mapset}/{task}`          | [crate::Mapset]     |
//! | `locations/{location}/mapsets/{mapset}/strds/{strds}`   | [crate::SpaceTimeRasterDataset] |
//! | `resources/{user_id}/{resource_id}`                     | [crate::Job]        |

use crate::types::{MapsetTask, ResourceId, UserId};

pub(crate) const VERSION: &str = "version";
pub(crate) const LOCATIONS: &str = "locations";

pub(crate) fn location(location: &str) -> String {
    format!("{}/{}", LOCATIONS, location)
}

pub(crate) fn location_task(location_name: &str, task: &str) -> String {
    format!("{}/{}", location(location_name), task)
}

pub(crate) fn mapsets(location: &str) -> String {
    location_task(location, "mapsets")
}

/// Provide the route to a mapset resource, optionally to one of its sub-resources.
pub(crate) fn mapset(location: &str, mapset: &str, task: Option<MapsetTask>) -> String {
    let base = format!("{}/{}", mapsets(location), mapset);
    match task {
        Some(task) => format!("{}/{}", base, task.as_str()),
        None => base,
    }
}

pub(crate) fn mapset_child(location: &str, mapset_name: &str, task: MapsetTask, name: &str) -> String {
    format!("{}/{}", mapset(location, mapset_name, Some(task)), name)
}

pub(crate) fn strds(location: &str, mapset_name: &str, strds: &str) -> String {
    mapset_child(location, mapset_name, MapsetTask::Strds, strds)
}

pub(crate) fn resource(user_id: &UserId, resource_id: &ResourceId) -> String {
    format!("resources/{}/{}", user_id, resource_id)
}
