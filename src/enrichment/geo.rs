//! Geolocation lookup against an ip-api compatible service

use crate::config::{EnrichmentConfig, UserAgentConfig};
use crate::crawler::user_agent_string;
use crate::enrichment::EnrichmentError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Response body of the lookup service
///
/// Only the fields the crawler reads are decoded; ip-api sends
/// `{"status": "success", "country": "...", ...}` on success and
/// `{"status": "fail", "message": "..."}` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeoResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl GeoResponse {
    /// Extracts the country, treating anything short of a successful answer
    /// with a non-empty country as a failed attempt
    pub fn into_country(self) -> Result<String, EnrichmentError> {
        if self.status != "success" {
            let reason = match self.message {
                Some(message) => format!("{} ({})", self.status, message),
                None => self.status,
            };
            return Err(EnrichmentError::Unsuccessful(reason));
        }

        match self.country {
            Some(country) if !country.trim().is_empty() => Ok(country),
            _ => Err(EnrichmentError::MissingCountry),
        }
    }
}

/// Geolocation collaborator
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Performs a single lookup for `ip`; retries are the caller's concern
    async fn lookup(&self, ip: &str) -> Result<GeoResponse, EnrichmentError>;
}

/// [`GeoLookup`] querying `{endpoint}/{ip}`
#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: Client,
    endpoint: String,
}

impl IpApiClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    /// Builds a client with its own request timeout
    pub fn from_config(
        config: &EnrichmentConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent_string(user_agent))
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn lookup(&self, ip: &str) -> Result<GeoResponse, EnrichmentError> {
        let url = format!("{}/{}", self.endpoint, ip);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Unsuccessful(format!("HTTP {}", status)));
        }

        Ok(response.json::<GeoResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup_client(server: &MockServer) -> IpApiClient {
        IpApiClient::new(Client::new(), format!("{}/json/", server.uri()))
    }

    #[test]
    fn test_into_country_success() {
        let response = GeoResponse {
            status: "success".to_string(),
            country: Some("Canada".to_string()),
            message: None,
        };
        assert_eq!(response.into_country().unwrap(), "Canada");
    }

    #[test]
    fn test_into_country_fail_status() {
        let response = GeoResponse {
            status: "fail".to_string(),
            country: None,
            message: Some("private range".to_string()),
        };
        match response.into_country() {
            Err(EnrichmentError::Unsuccessful(reason)) => {
                assert_eq!(reason, "fail (private range)")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_into_country_blank_country() {
        let response = GeoResponse {
            status: "success".to_string(),
            country: Some("  ".to_string()),
            message: None,
        };
        assert!(matches!(
            response.into_country(),
            Err(EnrichmentError::MissingCountry)
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = IpApiClient::new(Client::new(), "http://ip-api.com/json/");
        assert_eq!(client.endpoint(), "http://ip-api.com/json");
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/8.8.8.8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "country": "United States",
                "query": "8.8.8.8"
            })))
            .mount(&server)
            .await;

        let response = lookup_client(&server).lookup("8.8.8.8").await.unwrap();
        assert_eq!(response.into_country().unwrap(), "United States");
    }

    #[tokio::test]
    async fn test_lookup_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = lookup_client(&server).lookup("8.8.8.8").await;
        assert!(matches!(result, Err(EnrichmentError::Unsuccessful(_))));
    }

    #[tokio::test]
    async fn test_lookup_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = lookup_client(&server).lookup("8.8.8.8").await;
        assert!(matches!(result, Err(EnrichmentError::Transport(_))));
    }
}
