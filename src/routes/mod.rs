/// Router Module Index
///
/// Splits the edge's routes by who decides access to them. Site routes sit
/// behind the route gate; API routes are excluded from it and either answered
/// by the edge itself or relayed to the backend.

/// Page shells and static assets. Every request passes the route gate first.
pub mod site;

/// `/api/*`. Never gated; the backend enforces its own authentication.
pub mod api;
