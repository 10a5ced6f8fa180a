use std::time::Duration;

/// Public actinia deployment used when no URL is given.
pub const DEFAULT_ACTINIA_URL: &str = "https://actinia.mundialis.de";

pub const DEFAULT_API_VERSION: &str = "latest";

/// Interval between two polls of a job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Display name of a job when the caller does not give one.
pub const DEFAULT_JOB_NAME: &str = "unknown_job";

pub(crate) const DEFAULT_VALIDATION_JOB_NAME: &str = "unknown_validation_job";

/// Free-text marker with which actinia reports a space-time dataset without registered maps.
pub(crate) const EMPTY_DATASET_MARKER: &str = "Dataset is empty";
