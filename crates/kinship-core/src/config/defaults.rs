//! Default values for Kinship configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default storage backend name.
pub const DEFAULT_STORAGE_BACKEND: &str = "surreal";

/// Default base directory for kinship data.
pub const DEFAULT_DATA_DIR: &str = ".kinship";

/// Database directory name inside the data directory.
pub const DEFAULT_DB_DIR: &str = "graph.db";

/// SurrealDB namespace.
pub const DEFAULT_NAMESPACE: &str = "kinship";

/// SurrealDB database name.
pub const DEFAULT_DATABASE: &str = "genealogy";

// ============================================================================
// Server Defaults
// ============================================================================

/// Address the HTTP API binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port the HTTP API listens on.
pub const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// Guard Defaults
// ============================================================================

/// Whether edge validation walks ancestors to reject cycles.
pub const DEFAULT_DETECT_CYCLES: bool = true;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Filter directive used when neither `RUST_LOG` nor `-v` is given.
pub const DEFAULT_LOG_FILTER: &str = "kinship=info,kinship_core=info,tower_http=warn";

// ============================================================================
// File Locations
// ============================================================================

/// Project-local configuration file.
pub const LOCAL_CONFIG_FILE: &str = "kinship.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "kinship";

/// File name inside [`USER_CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";
