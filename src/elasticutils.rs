use crate::config::GatewayConfig;
use elasticsearch::{
    Elasticsearch,
    auth::Credentials,
    http::{
        Url,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
};
use std::error::Error;

/// Builds the Elasticsearch client for the configured node. No connection is
/// opened here; the transport dials lazily on the first request.
pub fn connect(config: &GatewayConfig) -> Result<Elasticsearch, Box<dyn Error + Sync + Send>> {
    let url = Url::parse(&config.elastic_host)?;
    let conn_pool = SingleNodeConnectionPool::new(url);
    let transport = TransportBuilder::new(conn_pool)
        .auth(Credentials::Basic(
            config.elastic_username.clone(),
            config.elastic_password.clone(),
        ))
        .disable_proxy()
        .build()?;
    let client = Elasticsearch::new(transport);

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_host(host: &str) -> GatewayConfig {
        GatewayConfig {
            port: 8080,
            elastic_host: host.to_string(),
            elastic_username: "elastic".to_string(),
            elastic_password: "changeme".to_string(),
            index: "311".to_string(),
            geom_field: "location".to_string(),
        }
    }

    #[test]
    fn test_connect_with_default_host() {
        assert!(connect(&config_with_host("http://localhost:9200")).is_ok());
    }

    #[test]
    fn test_connect_rejects_invalid_url() {
        assert!(connect(&config_with_host("not a url")).is_err());
    }
}
