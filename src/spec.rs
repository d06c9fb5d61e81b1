//! Declarative operator descriptions.
//!
//! An [`OperatorSpec`] is produced by a configuration-parsing collaborator and
//! handed to the factory. Parameter sections are validated only by the rule
//! that consumes them; everything else passes through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Requested backend for an operator.
///
/// Textual aliases are accepted so specs written against the reference
/// framework keep working (`caffe` for native, `cudnn` for accelerated).
/// Unrecognized names are kept as [`EnginePreference::Other`] and rejected by
/// the rule that reads them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnginePreference {
    #[default]
    Default,
    Native,
    Accelerated,
    Other(String),
}

impl From<String> for EnginePreference {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Self::Default,
            "native" | "caffe" => Self::Native,
            "accelerated" | "cudnn" => Self::Accelerated,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for EnginePreference {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EnginePreference> for String {
    fn from(value: EnginePreference) -> Self {
        value.to_string()
    }
}

impl fmt::Display for EnginePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnginePreference::Default => write!(f, "default"),
            EnginePreference::Native => write!(f, "native"),
            EnginePreference::Accelerated => write!(f, "accelerated"),
            EnginePreference::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One operator instance to construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Instance name, used in diagnostics.
    #[serde(default)]
    pub name: String,
    /// Selects the resolution rule.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub engine: EnginePreference,
    /// Number of output tensors the graph wires to this operator.
    #[serde(default = "default_num_outputs")]
    pub num_outputs: usize,
    #[serde(flatten)]
    pub params: ParamBag,
}

fn default_num_outputs() -> usize {
    1
}

impl OperatorSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            engine: EnginePreference::Default,
            num_outputs: default_num_outputs(),
            params: ParamBag::default(),
        }
    }

    pub fn with_engine(mut self, engine: impl Into<EnginePreference>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_outputs(mut self, num_outputs: usize) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    pub fn with_convolution(mut self, params: ConvolutionParams) -> Self {
        self.params.convolution = params;
        self
    }

    pub fn with_pooling(mut self, params: PoolingParams) -> Self {
        self.params.pooling = params;
        self
    }

    pub fn with_lrn(mut self, params: LrnParams) -> Self {
        self.params.lrn = params;
        self
    }

    pub fn with_script(mut self, params: ScriptParams) -> Self {
        self.params.script = Some(params);
        self
    }
}

/// Operator-specific parameter sections.
///
/// Sections a rule does not read are ignored. `extra` carries anything else
/// verbatim, mainly for script-defined operators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBag {
    #[serde(default)]
    pub convolution: ConvolutionParams,
    #[serde(default)]
    pub pooling: PoolingParams,
    #[serde(default)]
    pub lrn: LrnParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Parameters shared by convolution and deconvolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvolutionParams {
    pub num_output: u32,
    pub kernel_size: Vec<u32>,
    pub stride: Vec<u32>,
    pub pad: Vec<u32>,
    /// Per spatial dimension. Empty means no dilation.
    pub dilation: Vec<u32>,
    pub group: u32,
    pub bias_term: bool,
}

impl Default for ConvolutionParams {
    fn default() -> Self {
        Self {
            num_output: 0,
            kernel_size: Vec::new(),
            stride: Vec::new(),
            pad: Vec::new(),
            dilation: Vec::new(),
            group: 1,
            bias_term: true,
        }
    }
}

impl ConvolutionParams {
    /// True if any spatial dimension dilates the kernel.
    pub fn is_dilated(&self) -> bool {
        self.dilation.iter().any(|&d| d > 1)
    }

    pub fn with_dilation(mut self, dilation: impl Into<Vec<u32>>) -> Self {
        self.dilation = dilation.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMethod {
    #[default]
    Max,
    #[serde(alias = "ave")]
    Average,
    Stochastic,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolingParams {
    pub method: PoolMethod,
    pub kernel_size: Vec<u32>,
    pub stride: Vec<u32>,
    pub pad: Vec<u32>,
    pub global_pooling: bool,
}

impl PoolingParams {
    pub fn with_method(method: PoolMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormRegion {
    #[default]
    AcrossChannels,
    WithinChannel,
}

/// Local response normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LrnParams {
    /// Normalization window size.
    pub local_size: u32,
    pub alpha: f32,
    pub beta: f32,
    pub k: f32,
    pub norm_region: NormRegion,
}

impl Default for LrnParams {
    fn default() -> Self {
        Self {
            local_size: 5,
            alpha: 1.0,
            beta: 0.75,
            k: 1.0,
            norm_region: NormRegion::AcrossChannels,
        }
    }
}

impl LrnParams {
    pub fn across_channels(local_size: u32) -> Self {
        Self {
            local_size,
            ..Self::default()
        }
    }

    pub fn within_channel(local_size: u32) -> Self {
        Self {
            local_size,
            norm_region: NormRegion::WithinChannel,
            ..Self::default()
        }
    }
}

/// Location of a script-defined operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptParams {
    pub module: String,
    /// Callable inside `module` that builds the operator.
    pub symbol: String,
    #[serde(default)]
    pub param_str: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_aliases() {
        assert_eq!(EnginePreference::from("CUDNN"), EnginePreference::Accelerated);
        assert_eq!(EnginePreference::from("caffe"), EnginePreference::Native);
        assert_eq!(EnginePreference::from(""), EnginePreference::Default);
        assert_eq!(
            EnginePreference::from("opencl"),
            EnginePreference::Other("opencl".to_string())
        );
    }

    #[test]
    fn test_dilation_detection() {
        assert!(!ConvolutionParams::default().is_dilated());
        assert!(!ConvolutionParams::default().with_dilation([1, 1]).is_dilated());
        assert!(ConvolutionParams::default().with_dilation([1, 2]).is_dilated());
    }

    #[test]
    fn test_parse_spec_from_toml() {
        let spec: OperatorSpec = toml::from_str(
            r#"
name = "pool1"
type = "Pooling"
engine = "cudnn"
num_outputs = 2

[pooling]
method = "ave"
kernel_size = [3]
"#,
        )
        .unwrap();

        assert_eq!(spec.type_name, "Pooling");
        assert_eq!(spec.engine, EnginePreference::Accelerated);
        assert_eq!(spec.num_outputs, 2);
        assert_eq!(spec.params.pooling.method, PoolMethod::Average);
        assert_eq!(spec.params.lrn, LrnParams::default());
        assert!(spec.params.script.is_none());
    }

    #[test]
    fn test_minimal_spec_defaults() {
        let spec: OperatorSpec = toml::from_str(r#"type = "ReLU""#).unwrap();
        assert_eq!(spec.engine, EnginePreference::Default);
        assert_eq!(spec.num_outputs, 1);
        assert_eq!(spec.params.convolution.group, 1);
    }

    #[test]
    fn test_unknown_engine_survives_round_trip() {
        let spec = OperatorSpec::new("conv", "Convolution").with_engine("opencl");
        let json = serde_json::to_string(&spec).unwrap();
        let back: OperatorSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.engine, EnginePreference::Other("opencl".to_string()));
    }
}
