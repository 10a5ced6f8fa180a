//! Raster and vector layers of a mapset.

use crate::client::routes;
use crate::client::session::Session;
use crate::errors::ActiniaError;
use crate::models::data::{lenient_f64, lenient_i64, InfoMap, ProcessResponse, Region};
use crate::types::MapsetTask;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// What distinguishes a kind of layer.
pub trait LayerKind: Debug {
    /// Mapset sub-resource under which layers of this kind are listed.
    const TASK: MapsetTask;
    /// Used in log messages and job names.
    const LABEL: &'static str;

    /// Derive the region of a layer from its info.
    fn region(info: &InfoMap) -> Region;
}

fn horizontal_extent(info: &InfoMap) -> Region {
    Region {
        n: lenient_f64(info, "north"),
        s: lenient_f64(info, "south"),
        e: lenient_f64(info, "east"),
        w: lenient_f64(info, "west"),
        ..Default::default()
    }
}

#[derive(Debug)]
pub struct RasterKind;

impl LayerKind for RasterKind {
    const TASK: MapsetTask = MapsetTask::RasterLayers;
    const LABEL: &'static str = "raster";

    fn region(info: &InfoMap) -> Region {
        Region {
            nsres: lenient_f64(info, "nsres"),
            ewres: lenient_f64(info, "ewres"),
            rows: lenient_i64(info, "rows"),
            cols: lenient_i64(info, "cols"),
            cells: lenient_i64(info, "cells"),
            ..horizontal_extent(info)
        }
    }
}

#[derive(Debug)]
pub struct VectorKind;

impl LayerKind for VectorKind {
    const TASK: MapsetTask = MapsetTask::VectorLayers;
    const LABEL: &'static str = "vector";

    fn region(info: &InfoMap) -> Region {
        Region {
            t: lenient_f64(info, "top"),
            b: lenient_f64(info, "bottom"),
            ..horizontal_extent(info)
        }
    }
}

/// A layer in a mapset, of which the info is fetched lazily.
#[derive(Debug)]
pub struct Layer<K: LayerKind> {
    session: Arc<Session>,
    location: String,
    mapset: String,
    name: String,
    info: Option<InfoMap>,
    region: Option<Region>,
    phantom: PhantomData<K>,
}

pub type Raster = Layer<RasterKind>;
pub type Vector = Layer<VectorKind>;

impl<K: LayerKind> Layer<K> {
    pub(crate) fn new(session: Arc<Session>, location: &str, mapset: &str, name: &str) -> Self {
        Self {
            session,
            location: location.to_string(),
            mapset: mapset.to_string(),
            name: name.to_string(),
            info: None,
            region: None,
            phantom: Default::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region derived from the info of the layer, if it was fetched.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Cached info of the layer, fetched on first call or when `force` is set.
    pub async fn get_info(&mut self, force: bool) -> Result<&InfoMap, ActiniaError> {
        if force || self.info.is_none() {
            let route = routes::mapset_child(&self.location, &self.mapset, K::TASK, &self.name);
            let res: ProcessResponse<InfoMap> =
                self.session.get(&self.session.endpoint(&route)).await?;
            self.region = Some(K::region(&res.process_results));
            self.info = Some(res.process_results);
        }
        // populated just above if it was empty
        Ok(self.info.get_or_insert_with(InfoMap::new))
    }
}
