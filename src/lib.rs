//! Client library for [actinia](https://actinia.mundialis.de), a REST API for
//! geoprocessing with GRASS GIS.
//!
//! ```no_run
//! # async fn run() -> Result<(), actinia::errors::ClientError> {
//! use actinia::{Actinia, ActiniaUrl, Username};
//! use serde_json::json;
//!
//! let mut client = Actinia::builder(ActiniaUrl::from_static("https://actinia.mundialis.de"))
//!     .api_version("v3")
//!     .credentials(Username::from_static("demouser"), "gu3st!pa55w0rd")
//!     .connect()
//!     .await?;
//! let locations = client.get_locations(false).await?;
//! let mapsets = locations
//!     .get_mut("nc_spm_08")
//!     .unwrap()
//!     .get_mapsets(false)
//!     .await?;
//! let job = mapsets
//!     .get("PERMANENT")
//!     .unwrap()
//!     .create_processing_job(json!({"version": "1", "list": []}), Some("my_job"))
//!     .await?;
//! let code = job.wait().await?;
//! println!("{} ended with {}: {}", job.name(), code, job.message());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
pub mod errors;
pub mod models;
pub mod process_chain;
pub mod requests;
pub mod types;

pub use client::actinia::{Actinia, ActiniaBuilder};
pub use models::*;
pub use process_chain::{ProcessChain, ProcessChainBody, ProcessChainItem};
pub use requests::{GeometryInput, RenderParams, TimeArg};
pub use types::*;
