//! Fields with no equivalent on the target platform.
//!
//! The builders ignore these. Reporting them is left to the caller.

use stevedore_common::types::ServiceConfig;

/// Returns the populated fields of `config` that are dropped during
/// conversion, in a stable order.
#[must_use]
pub fn unsupported_fields(config: &ServiceConfig) -> Vec<&'static str> {
    let checks = [
        ("networks", !config.networks.is_empty()),
        ("cpu_set", !config.cpu_set.is_empty()),
        ("cpu_shares", config.cpu_shares != 0),
        ("cpu_quota", config.cpu_quota != 0),
        ("mem_limit", config.mem_limit != 0),
        ("cap_add", !config.cap_add.is_empty()),
        ("cap_drop", !config.cap_drop.is_empty()),
        ("expose", !config.expose.is_empty()),
        ("user", !config.user.is_empty()),
    ];
    checks
        .into_iter()
        .filter_map(|(field, populated)| populated.then_some(field))
        .collect()
}
