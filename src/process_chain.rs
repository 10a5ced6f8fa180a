//! Process chains: the server-side description of a sequence of GRASS modules.
//!
//! The client does not interpret process chains. It only needs to turn one
//! into the text of a request body.

use crate::client::session::Payload;
use crate::errors::ClientError;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A process chain, as given by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessChain {
    Json(Value),
    /// Already serialized process chain, sent verbatim.
    Text(String),
    /// File whose content is sent verbatim.
    File(Utf8PathBuf),
}

impl ProcessChain {
    pub(crate) async fn into_payload(self) -> Result<Payload, ClientError> {
        let body = match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
            Self::File(path) => fs_err::tokio::read_to_string(path).await?,
        };
        Ok(Payload::Json(body))
    }
}

impl From<Value> for ProcessChain {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<ProcessChainBody> for ProcessChain {
    fn from(value: ProcessChainBody) -> Self {
        // a struct of strings and lists always serializes
        Self::Json(serde_json::to_value(value).unwrap_or(Value::Null))
    }
}

impl From<String> for ProcessChain {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Utf8PathBuf> for ProcessChain {
    fn from(value: Utf8PathBuf) -> Self {
        Self::File(value)
    }
}

/// A `{"param": ..., "value": ...}` pair of a process chain item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub param: String,
    pub value: String,
}

/// One module call of a process chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessChainItem {
    pub id: String,
    pub module: String,
    pub inputs: Vec<Param>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outputs: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub overwrite: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub superquiet: bool,
}

impl ProcessChainItem {
    /// Create an item calling `module` with the given `(param, value)` inputs.
    pub fn new<'a>(
        id: impl Into<String>,
        module: impl Into<String>,
        inputs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            id: id.into(),
            module: module.into(),
            inputs: to_params(inputs),
            outputs: Vec::new(),
            flags: None,
            stdin: None,
            stdout: None,
            overwrite: false,
            superquiet: false,
        }
    }

    pub fn outputs<'a>(mut self, outputs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.outputs = to_params(outputs);
        self
    }

    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn stdout(mut self, stdout: Value) -> Self {
        self.stdout = Some(stdout);
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn superquiet(mut self, superquiet: bool) -> Self {
        self.superquiet = superquiet;
        self
    }
}

fn to_params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<Param> {
    pairs
        .into_iter()
        .map(|(param, value)| Param {
            param: param.to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// A complete process chain document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessChainBody {
    pub version: String,
    pub list: Vec<ProcessChainItem>,
}

impl ProcessChainBody {
    pub fn new(list: Vec<ProcessChainItem>) -> Self {
        Self {
            version: "1".to_string(),
            list,
        }
    }
}
