/// Liveness check: GET /up
pub async fn health_check() -> &'static str {
    "OK"
}
