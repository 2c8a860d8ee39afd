/// Liveness endpoint
///
/// Fixed plain-text body confirming the process is up. No auth, no CORS
/// restrictions beyond the shared gatekeeper, no database round-trip.
pub async fn liveness() -> &'static str {
    "API WORKING"
}
