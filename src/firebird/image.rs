//! Container image and protocol constants for the Firebird server.

pub const REGISTRY: &str = "docker.io";
pub const IMAGE: &str = "firebirdsql/firebird";
pub const TAG: &str = "latest";

pub const PRIMARY_ENDPOINT_NAME: &str = "tcp";
pub const TARGET_PORT: u16 = 3050;

/// Identity used in connection strings when no user parameter is supplied.
pub const DEFAULT_USER_NAME: &str = "SYSDBA";

pub const ENV_USER: &str = "FIREBIRD_USER";
pub const ENV_PASSWORD: &str = "FIREBIRD_PASSWORD";
pub const ENV_ROOT_PASSWORD: &str = "FIREBIRD_ROOT_PASSWORD";
pub const ENV_DATABASE: &str = "FIREBIRD_DATABASE";
pub const ENV_TIME_ZONE: &str = "TZ";
pub const ENV_USE_LEGACY_AUTH: &str = "FIREBIRD_USE_LEGACY_AUTH";
