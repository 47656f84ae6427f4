//! Final support verdict for a scope
//!
//! Only ever sets `unsupported`; a verdict reached earlier (for example by
//! the feature gate) is never cleared.

use psan_contract::ExecutionConfig;

use crate::facts::{HostOs, SuiteFacts};

/// Host platforms the psan runtime supports
pub const SUPPORTED_HOSTS: [HostOs; 4] = [
    HostOs::FreeBSD,
    HostOs::Linux,
    HostOs::Darwin,
    HostOs::NetBSD,
];

pub fn is_supported_host(host: &HostOs) -> bool {
    SUPPORTED_HOSTS.contains(host)
}

/// Mark `config` unsupported for an unsupported host or an Android target.
pub fn apply_support_gate(facts: &SuiteFacts, config: &mut ExecutionConfig) {
    if !is_supported_host(&facts.host_os) {
        tracing::info!(scope = %config.scope, host = %facts.host_os, "host OS not supported");
        config.mark_unsupported(format!("host OS '{}' is not supported", facts.host_os));
    }

    if facts.android {
        tracing::info!(scope = %config.scope, "android targets not supported");
        config.mark_unsupported("android targets are not supported");
    }
}
