use crate::errors::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Job lifecycle status
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Accepted,
    Running,
    Finished,
    Error,
    Terminated,
}

impl JobStatus {
    /// A terminal status is never followed by another transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Error | Self::Terminated)
    }

    /// Result code reported by [crate::Job::poll_until_finished] once the job is terminal.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Finished => Some(0),
            Self::Error | Self::Terminated => Some(1),
            Self::Accepted | Self::Running => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
            Self::Terminated => "terminated",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temporal type of a space-time dataset.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemporalType {
    #[default]
    Absolute,
    Relative,
}

impl FromStr for TemporalType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(Self::Absolute),
            "relative" => Ok(Self::Relative),
            _ => Err(ClientError::Validation(
                "temporal_type must be 'absolute' or 'relative'.".to_string(),
            )),
        }
    }
}

/// Sub-resources of a mapset.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MapsetTask {
    Info,
    RasterLayers,
    VectorLayers,
    Strds,
    ProcessingAsync,
}

impl MapsetTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::RasterLayers => "raster_layers",
            Self::VectorLayers => "vector_layers",
            Self::Strds => "strds",
            Self::ProcessingAsync => "processing_async",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(JobStatus::Accepted, false, None)]
    #[case(JobStatus::Running, false, None)]
    #[case(JobStatus::Finished, true, Some(0))]
    #[case(JobStatus::Error, true, Some(1))]
    #[case(JobStatus::Terminated, true, Some(1))]
    fn test_terminal_classification(
        #[case] status: JobStatus,
        #[case] terminal: bool,
        #[case] code: Option<i32>,
    ) {
        assert_eq!(status.is_terminal(), terminal);
        assert_eq!(status.exit_code(), code);
    }

    #[test]
    fn test_deserialize_status() {
        let status: JobStatus = serde_json::from_str("\"terminated\"").unwrap();
        assert_eq!(status, JobStatus::Terminated);
        assert!(serde_json::from_str::<JobStatus>("\"pending\"").is_err());
    }

    #[rstest]
    #[case("absolute", TemporalType::Absolute)]
    #[case("relative", TemporalType::Relative)]
    fn test_parse_temporal_type(#[case] s: &str, #[case] expected: TemporalType) {
        assert_eq!(s.parse::<TemporalType>().unwrap(), expected)
    }

    #[test]
    fn test_reject_temporal_type() {
        assert!(matches!(
            "sometimes".parse::<TemporalType>(),
            Err(ClientError::Validation(_))
        ))
    }
}
