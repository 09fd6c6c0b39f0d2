/// HTTP endpoint paths for the FlightCache protocol.
pub mod endpoints {
    pub const LIST_FLIGHTS: &str = "/v1/flights/list";
    pub const FLIGHT_INFO: &str = "/v1/flights/info";
    pub const DO_GET: &str = "/v1/flights/get";
    pub const DO_PUT: &str = "/v1/flights/put";
    pub const DO_ACTION: &str = "/v1/actions";
    pub const LIST_ACTIONS: &str = "/v1/actions/list";
    pub const HEALTH: &str = "/v1/health";
}

/// Content type of every framed protocol body.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: super::message::PROTOCOL_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_defaults() {
        let h = HealthResponse::default();
        assert_eq!(h.status, "ok");
        assert_eq!(h.protocol_version, 1);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::HEALTH, "/v1/health");
        assert_eq!(endpoints::FLIGHT_INFO, "/v1/flights/info");
        assert_eq!(endpoints::DO_GET, "/v1/flights/get");
        assert_eq!(endpoints::DO_PUT, "/v1/flights/put");
    }
}
