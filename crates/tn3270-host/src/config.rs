//! Host Adapter spawn configuration.

/// Configuration for spawning the emulator subprocess.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Target host name or address.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Path to the emulator executable (a wrapper script or a native
    /// 3270 client built to speak the line protocol in `transport.rs`).
    pub program: String,
    /// Extra arguments passed to `program`, after `host`/`port`.
    pub extra_args: Vec<String>,
}

impl HostConfig {
    /// Build a config for `host:port` using the default emulator binary
    /// name, resolved via `PATH` at spawn time.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            program: Self::DEFAULT_PROGRAM.into(),
            extra_args: Vec::new(),
        }
    }

    /// Default emulator executable name.
    pub const DEFAULT_PROGRAM: &'static str = "tn3270-emulator";

    /// Full argument list: `[host, port, ...extra_args]`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.host.clone(), self.port.to_string()];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_lead_with_host_and_port() {
        let cfg = HostConfig::new("mvs.example.com", 23);
        assert_eq!(cfg.args(), vec!["mvs.example.com", "23"]);
    }

    #[test]
    fn extra_args_are_appended() {
        let mut cfg = HostConfig::new("mvs.example.com", 992);
        cfg.extra_args.push("--tls".into());
        assert_eq!(cfg.args(), vec!["mvs.example.com", "992", "--tls"]);
    }
}
