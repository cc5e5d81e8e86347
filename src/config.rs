/// Runtime settings for the gateway, read once at startup and handed to the
/// HTTP workers through `web::Data`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub elastic_host: String,
    pub elastic_username: String,
    pub elastic_password: String,
    pub index: String,
    pub geom_field: String,
}

impl GatewayConfig {
    pub fn from_env() -> GatewayConfig {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> GatewayConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        GatewayConfig {
            port: lookup("PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(8080),
            elastic_host: lookup("ELASTIC_HOST")
                .unwrap_or_else(|| "http://localhost:9200".to_string()),
            elastic_username: lookup("ELASTIC_USER").unwrap_or_else(|| "elastic".to_string()),
            elastic_password: lookup("ELASTIC_PASSWORD")
                .unwrap_or_else(|| "changeme".to_string()),
            index: lookup("ELASTIC_INDEX").unwrap_or_else(|| "311".to_string()),
            geom_field: lookup("ELASTIC_GEOM_FIELD").unwrap_or_else(|| "location".to_string()),
        }
    }
}
