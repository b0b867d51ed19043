// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths, log filters and identifiers)
pub const APP_NAME_LOWER: &str = "geoenrich";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "geoenrich.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "GEOENRICH_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "GEOENRICH_LOG";

/// Environment variable to switch logs to JSON lines
pub const ENV_LOG_JSON: &str = "GEOENRICH_LOG_JSON";

// =============================================================================
// Environment Variables - Stage
// =============================================================================

/// Environment variable for the ipinfo.io access token
pub const ENV_TOKEN: &str = "GEOENRICH_TOKEN";

/// Environment variable for the event field holding the IP address
pub const ENV_INPUT_KEY: &str = "GEOENRICH_INPUT_KEY";

/// Environment variable for the event field receiving the attributes
pub const ENV_OUTPUT_KEY: &str = "GEOENRICH_OUTPUT_KEY";

/// Environment variable for the comma-separated attribute wishlist
pub const ENV_FIELDS: &str = "GEOENRICH_FIELDS";

// =============================================================================
// Environment Variables - Client
// =============================================================================

/// Environment variable to override the lookup service URL
pub const ENV_BASE_URL: &str = "GEOENRICH_BASE_URL";

/// Environment variable for the per-request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "GEOENRICH_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Cache
// =============================================================================

/// Environment variable for the attribute cache capacity
pub const ENV_CACHE_MAX_ENTRIES: &str = "GEOENRICH_CACHE_MAX_ENTRIES";

/// Environment variable for the attribute cache TTL in seconds
pub const ENV_CACHE_TTL_SECS: &str = "GEOENRICH_CACHE_TTL_SECS";

// =============================================================================
// Stage Defaults
// =============================================================================

/// Event field read for the IP address
pub const DEFAULT_INPUT_KEY: &str = "ip_address";

/// Event field the selected attributes are written to
pub const DEFAULT_OUTPUT_KEY: &str = "ipinfo";

/// Attributes extracted when no wishlist is configured
pub const DEFAULT_FIELDS: &[&str] = &["country_name", "region", "city", "latitude", "longitude"];

// =============================================================================
// Cache Defaults
// =============================================================================

/// Attribute cache capacity (entries)
pub const CACHE_MAX_ENTRIES: usize = 4096;

/// Attribute cache TTL: 7 days
pub const CACHE_TTL_SECS: u64 = 60 * 60 * 24 * 7;
