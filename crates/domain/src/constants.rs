//! Domain constants

/// Lifetime of an OAuth anti-forgery state token.
pub const STATE_TOKEN_TTL_SECONDS: i64 = 600;

/// Access tokens this close to expiry are refreshed before use.
pub const TOKEN_REFRESH_THRESHOLD_SECONDS: i64 = 60;

/// Margin added around a requested date when fetching busy intervals, to
/// cover events that straddle midnight in the configured timezone.
pub const BUSY_FETCH_MARGIN_HOURS: i64 = 24;

/// Upper bound on appointment type duration.
pub const MAX_DURATION_MINUTES: i64 = 480;

/// Timeout applied to every calendar provider call.
pub const PROVIDER_TIMEOUT_SECONDS: u64 = 10;
