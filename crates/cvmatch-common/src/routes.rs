//! Route and endpoint constants for CV-Match clients
//!
//! These constants are compiled into the binary so the session layer, the
//! route guards, and the navigation seam all agree on destinations without
//! an external configuration file.

/// Default base URL for the CV-Match API
pub const DEFAULT_API_URL: &str = "https://api.cvmatch.io";

/// Login page
pub const LOGIN_ROUTE: &str = "/login";

/// Registration page
pub const REGISTER_ROUTE: &str = "/register";

/// OTP verification step after registration
pub const VERIFY_OTP_ROUTE: &str = "/verify-otp";

/// Password reset request page
pub const FORGOT_PASSWORD_ROUTE: &str = "/forgot-password";

/// Password reset completion page (reached from the emailed link)
pub const RESET_PASSWORD_ROUTE: &str = "/reset-password";

/// Post-OAuth role selection step for new Google accounts
pub const ROLE_SELECTION_ROUTE: &str = "/role-selection";

/// Authenticated landing destination
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Destination for authenticated users whose role does not match a route
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// Marketing landing page
pub const HOME_ROUTE: &str = "/";

/// Routes reachable without a session
///
/// Session initialization skips network validation entirely when the user
/// lands on one of these with no stored tokens.
pub const PUBLIC_ROUTES: &[&str] = &[
    HOME_ROUTE,
    LOGIN_ROUTE,
    REGISTER_ROUTE,
    VERIFY_OTP_ROUTE,
    FORGOT_PASSWORD_ROUTE,
    RESET_PASSWORD_ROUTE,
    ROLE_SELECTION_ROUTE,
    "/pricing",
    "/about",
    "/contact",
];

/// Routes that only make sense for signed-out users
///
/// An already-authenticated session landing on one of these is redirected
/// to [`DASHBOARD_ROUTE`].
pub const AUTH_ONLY_ROUTES: &[&str] = &[
    LOGIN_ROUTE,
    REGISTER_ROUTE,
    VERIFY_OTP_ROUTE,
    FORGOT_PASSWORD_ROUTE,
    RESET_PASSWORD_ROUTE,
    ROLE_SELECTION_ROUTE,
];

/// Classify a path against the public route set, ignoring query and fragment
pub fn is_public_route(path: &str) -> bool {
    let path = normalize_path(path);
    PUBLIC_ROUTES.iter().any(|route| *route == path)
}

/// True if the path is one of the signed-out-only auth pages
pub fn is_auth_only_route(path: &str) -> bool {
    let path = normalize_path(path);
    AUTH_ONLY_ROUTES.iter().any(|route| *route == path)
}

/// Canonical form of a path for route comparison: query and fragment are
/// dropped and a trailing slash is trimmed (except on the root path).
pub fn normalize_path(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    let path = path.split('#').next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_classification() {
        assert!(is_public_route("/login"));
        assert!(is_public_route("/login?next=/dashboard"));
        assert!(is_public_route("/pricing/"));
        assert!(is_public_route("/"));
        assert!(!is_public_route("/dashboard"));
        assert!(!is_public_route("/settings"));
    }

    #[test]
    fn test_auth_only_route_classification() {
        assert!(is_auth_only_route("/login"));
        assert!(is_auth_only_route("/reset-password?token=abc"));
        assert!(!is_auth_only_route("/pricing"));
        assert!(!is_auth_only_route("/"));
    }

    #[test]
    fn test_normalize_drops_query_fragment_and_trailing_slash() {
        assert_eq!(normalize_path("/login?next=/dashboard#top"), "/login");
        assert_eq!(normalize_path("/login#section"), "/login");
        assert_eq!(normalize_path("/pricing/"), "/pricing");
        assert_eq!(normalize_path("/"), "/");
    }
}
