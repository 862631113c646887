//! Header names shared between the client and Core.

/// Correlation token attached to every outbound request and debug stream.
pub const REQUEST_ID: &str = "X-Request-Id";

/// Service-declared secondary status, distinct from the HTTP status.
pub const RESPONSE_CODE: &str = "Response-Code";

/// Identity of the user on whose behalf a module method is executed.
pub const USER_ID: &str = "User-Id";

/// Content type used for every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json";
