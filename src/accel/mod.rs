//! Accelerated engine capabilities.
//!
//! The accelerated engine is a vendor library (cuDNN class) whose kernels live
//! outside this crate. What the resolution rules need is a read-only picture
//! of what it can do in this build and on this machine: the
//! [`CapabilityProbe`]. It is established once, at startup, and passed to
//! every rule.

pub mod manager;

pub use manager::detect;

use serde::Serialize;

/// Largest normalization window the accelerated LRN kernel accepts.
pub const DEFAULT_MAX_LRN_WINDOW: u32 = 16;

/// Library version assumed when none is configured.
pub const DEFAULT_VERSION: &str = "5.1";

/// Which implementation family an operator instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Reference implementation; supports every parameter combination.
    Native,
    /// Vendor-accelerated implementation.
    Accelerated,
    /// Constructed by an embedded scripting runtime.
    Foreign,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Native => write!(f, "native"),
            Engine::Accelerated => write!(f, "accelerated"),
            Engine::Foreign => write!(f, "foreign"),
        }
    }
}

/// Snapshot of accelerated-engine support.
///
/// The gap flags are `false` when the engine is known not to handle the
/// feature correctly; rules downgrade to the native engine in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityProbe {
    /// Accelerated support built into this binary.
    pub compiled: bool,
    /// Compiled in and enabled at runtime.
    pub available: bool,
    pub version: Option<String>,
    pub max_lrn_window: u32,
    pub dilated_convolution: bool,
    pub multi_output_pooling: bool,
    /// Max pooling stays correct when a downstream layer works in place.
    pub max_pooling_in_place: bool,
}

impl CapabilityProbe {
    /// A build without the accelerated engine.
    pub fn native_only() -> Self {
        Self {
            compiled: false,
            available: false,
            version: None,
            max_lrn_window: DEFAULT_MAX_LRN_WINDOW,
            dilated_convolution: false,
            multi_output_pooling: false,
            max_pooling_in_place: false,
        }
    }

    /// The accelerated engine present with its usual functional gaps.
    pub fn accelerated() -> Self {
        Self {
            compiled: true,
            available: true,
            version: Some(DEFAULT_VERSION.to_string()),
            ..Self::native_only()
        }
    }

    pub fn with_max_lrn_window(mut self, window: u32) -> Self {
        self.max_lrn_window = window;
        self
    }

    pub fn with_dilated_convolution(mut self, supported: bool) -> Self {
        self.dilated_convolution = supported;
        self
    }

    pub fn with_multi_output_pooling(mut self, supported: bool) -> Self {
        self.multi_output_pooling = supported;
        self
    }

    pub fn with_max_pooling_in_place(mut self, supported: bool) -> Self {
        self.max_pooling_in_place = supported;
        self
    }

    /// Turn the accelerated engine off, keeping the other facts.
    pub fn disabled(mut self) -> Self {
        self.available = false;
        self
    }
}

impl Default for CapabilityProbe {
    fn default() -> Self {
        Self::native_only()
    }
}
