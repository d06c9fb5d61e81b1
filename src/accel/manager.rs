use tracing::{debug, info, warn};

use super::{CapabilityProbe, DEFAULT_VERSION};
use crate::config::AcceleratorConfig;

/// Environment switch that turns the accelerated engine off at runtime.
pub const ACCEL_ENV: &str = "OPFORGE_ACCEL";

/// Build the process capability probe.
///
/// Combines what was compiled in (`accel` feature) with the runtime switch in
/// the configuration and the `OPFORGE_ACCEL` environment override. Gap flags
/// and limits come from configuration so a newer library can lift them.
pub fn detect(config: &AcceleratorConfig) -> CapabilityProbe {
    let compiled = cfg!(feature = "accel");
    let env_value = std::env::var(ACCEL_ENV).ok();
    let enabled = config.enabled && !env_value.as_deref().is_some_and(is_disabled);

    if config.enabled && !enabled {
        debug!(var = ACCEL_ENV, "accelerated engine disabled by environment");
    }
    if enabled && !compiled {
        debug!("accelerated engine not compiled in; build with the `accel` feature");
    }

    let window = if config.max_lrn_window == 0 {
        warn!("max_lrn_window = 0 is not usable, keeping the default");
        super::DEFAULT_MAX_LRN_WINDOW
    } else {
        config.max_lrn_window
    };

    let probe = CapabilityProbe {
        compiled,
        available: compiled && enabled,
        version: compiled.then(|| {
            config
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string())
        }),
        max_lrn_window: window,
        dilated_convolution: config.dilated_convolution,
        multi_output_pooling: config.multi_output_pooling,
        max_pooling_in_place: config.max_pooling_in_place,
    };

    info!(
        "Capability probe established. Compiled: {}, Available: {}, Version: {}, LRN window: {}",
        probe.compiled,
        probe.available,
        probe.version.as_deref().unwrap_or("-"),
        probe.max_lrn_window
    );

    probe
}

/// `0`, `off`, `false` and `no` disable; anything else leaves the engine on.
fn is_disabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "off" | "false" | "no"
    )
}
