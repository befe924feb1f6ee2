//! Shared constants used across CipherStudio crates.

/// Default API port for the CipherStudio backend.
pub const DEFAULT_PORT: u16 = 5000;

/// Default maximum request body size accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default bearer token lifetime (7 days).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default bcrypt work factor for stored password hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:5000";

/// Project id used when no project has been selected yet.
pub const DEFAULT_PROJECT_ID: &str = "proj123";

/// Display name attached to projects saved without an explicit name.
pub const DEFAULT_PROJECT_NAME: &str = "My CipherStudio Project";

/// Plain-text body served by the backend root route.
pub const BACKEND_BANNER: &str = "CipherStudio Backend Running...";
