//! Default values for kitchen configuration.

/// Roles with this prefix describe environments and are hidden from role lists.
pub const DEFAULT_EXCLUDE_ROLE_PREFIX: &str = "env";

/// Environment shown when the URL carries no `env` parameter.
pub const DEFAULT_ENV: &str = "production";

/// Virtualization role shown when the URL carries no `virt` parameter.
pub const DEFAULT_VIRT: &str = "guest";

pub const DEFAULT_SYNC_PERIOD_MINUTES: u64 = 2;

pub const DEFAULT_HOST: &str = "127.0.0.1";

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_MONITORING_URL: &str = "http://monitoring.mydomain.com";

/// Virtualization roles offered in the sidebar.
pub const VIRT_ROLES: [&str; 2] = ["host", "guest"];
