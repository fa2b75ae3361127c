//! Default polling values
//!
//! Call sites override these per operation; nothing here is process-wide
//! mutable state.

use std::time::Duration;

/// First delay of the exponential schedule when no fixed interval is set
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Cap on exponential growth between probes
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10);

/// Growth factor of the exponential schedule
pub const DEFAULT_BACKOFF_FACTOR: f32 = 2.0;

/// Overall wait budget (20 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Consecutive absent observations tolerated while waiting for a target
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Consecutive target observations required for success
pub const DEFAULT_CONTINUOUS_TARGET_OCCURRENCES: u32 = 1;

/// Label used in logs when the caller does not name the resource
pub const DEFAULT_RESOURCE_NAME: &str = "resource";
