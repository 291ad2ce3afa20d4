use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::TriageApi;
use crate::config::{Config, SchemaVersion};
use crate::error::TriageError;
use crate::types::{ApiErrorBody, HealthStatus, TriageRequest, TriageResponse};

/// Body of a v1 (direct agent) response. Extra fields are ignored.
#[derive(Deserialize)]
struct BasicTriageResponse {
    resultado_triagem: String,
}

/// HTTP client for the triage service
#[derive(Debug, Clone)]
pub struct TriageClient {
    client: Client,
    endpoint: Url,
    health_url: Url,
    schema: SchemaVersion,
}

impl TriageClient {
    pub fn new(config: &Config) -> Result<Self, TriageError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            health_url: config.health_url(),
            schema: config.schema,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Query the gateway's `/health` report
    pub async fn health(&self) -> Result<HealthStatus, TriageError> {
        let response = self.client.get(self.health_url.clone()).send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TriageApi for TriageClient {
    async fn triage(&self, symptoms: &str) -> Result<TriageResponse, TriageError> {
        info!(endpoint = %self.endpoint, schema = %self.schema, "sending triage request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&TriageRequest { symptoms })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "triage response received");

        if !status.is_success() {
            let err = api_error(status, &body);
            warn!(status = status.as_u16(), error = %err, "triage API reported a failure");
            return Err(err);
        }

        Ok(decode_response(self.schema, &body)?)
    }
}

/// Decode a 2xx body according to `schema`
pub fn decode_response(schema: SchemaVersion, body: &[u8]) -> Result<TriageResponse, serde_json::Error> {
    match schema {
        SchemaVersion::V1 => {
            let basic: BasicTriageResponse = serde_json::from_slice(body)?;
            Ok(TriageResponse::classification_only(basic.resultado_triagem))
        }
        SchemaVersion::V2 => serde_json::from_slice(body),
    }
}

/// `detail` from the error body, falling back to the status reason phrase
fn api_error(status: StatusCode, body: &[u8]) -> TriageError {
    let detail = ApiErrorBody::detail_from(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string())
    });

    TriageError::Api {
        status: status.as_u16(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "resultado_triagem": "Urgência MÉDIA",
        "recomendacoes": { "observacoes": "Monitore.", "recomendacoes_especificas": ["Hidrate-se"] }
    }"#;

    #[test]
    fn test_v1_ignores_recommendations() {
        let response = decode_response(SchemaVersion::V1, FULL.as_bytes()).unwrap();
        assert_eq!(response.classification, "Urgência MÉDIA");
        assert!(response.recommendations.is_none());
    }

    #[test]
    fn test_v2_keeps_recommendations() {
        let response = decode_response(SchemaVersion::V2, FULL.as_bytes()).unwrap();
        let recs = response.recommendations.unwrap();
        assert_eq!(recs.specific, vec!["Hidrate-se".to_string()]);
    }

    #[test]
    fn test_non_json_success_body_is_malformed() {
        assert!(decode_response(SchemaVersion::V2, b"OK").is_err());
        assert!(decode_response(SchemaVersion::V1, b"{}").is_err());
    }

    #[test]
    fn test_api_error_prefers_detail() {
        let err = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "serviço indisponível"}"#.as_bytes(),
        );
        match err {
            TriageError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "serviço indisponível");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_status_text() {
        let err = api_error(StatusCode::SERVICE_UNAVAILABLE, b"");
        match err {
            TriageError::Api { detail, .. } => assert_eq!(detail, "Service Unavailable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_client_takes_settings_from_config() {
        let mut config = Config::from_endpoint("http://127.0.0.1:9/triagem").unwrap();
        config.schema = SchemaVersion::V1;

        let client = TriageClient::new(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:9/triagem");
        assert_eq!(client.schema(), SchemaVersion::V1);
    }
}
