//! eBPF program attachment planning.
//!
//! Placeholder: the agent does not load BPF bytecode yet. This module only
//! reports what the current configuration asks for, so operators can verify
//! the program list before real attachment lands.

use tracing::info;

use crate::config::model::EbpfConfig;

/// Logs the attachment plan for the configured programs.
pub fn report_plan(config: &EbpfConfig) {
    if !config.enabled {
        info!("ebpf monitoring disabled");
        return;
    }

    for program in &config.programs {
        info!(
            name = %program.name,
            probe_type = %program.probe_type,
            target = %program.target,
            "ebpf program configured (attachment not yet implemented)"
        );
    }
}
