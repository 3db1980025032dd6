/// Cluster-internal DNS suffix appended to namespaced services
pub const CLUSTER_DOMAIN: &str = "svc.cluster.local";

/// Port assumed for a namespaced (in-cluster) service when none is configured
pub const DEFAULT_CLUSTER_PORT: u16 = 8080;

/// Port assumed for an external host when none is configured
pub const DEFAULT_EXTERNAL_PORT: u16 = 443;

/// Connect timeout for a single reachability check, in milliseconds
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 500;

/// How long a finished probe pass is served before the next request re-probes
pub const DEFAULT_CACHE_TTL_MS: u64 = 4000;

/// Query value that selects the plain text table; anything else renders HTML
pub const FORMAT_TEXT: &str = "text";

/// Display format for the Checked At column
pub const CHECKED_AT_FORMAT: &str = "%H:%M:%S";

/// Status glyphs
pub const GLYPH_REACHABLE: &str = "✅";
pub const GLYPH_UNREACHABLE: &str = "❌";

