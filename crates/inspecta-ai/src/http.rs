//! HTTP client for the hosted enhancement and photo-analysis functions.

use async_trait::async_trait;
use inspecta_core::{PhotoAnalysis, SuggestionBundle};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::wire::{PhotoResponse, SuggestionResponse};
use crate::{EnhanceRequest, InferenceClient, InferenceConfig, InferenceError, PhotoScanRequest};

const ENHANCE_PATH: &str = "enhance-observation";
const PHOTO_PATH: &str = "analyse-safety-photo";

/// [`InferenceClient`] backed by two JSON-over-HTTP endpoints.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpInferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, InferenceError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "calling inference endpoint");

        let mut req = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn enhance_observation(
        &self,
        request: &EnhanceRequest,
    ) -> Result<SuggestionBundle, InferenceError> {
        let resp: SuggestionResponse = self.post(ENHANCE_PATH, request).await?;
        let bundle = resp.into_bundle()?;
        info!(
            code = %bundle.suggested_code(),
            confidence = bundle.confidence(),
            regulations = bundle.regulations().len(),
            "received suggestion bundle"
        );
        Ok(bundle)
    }

    async fn analyse_photo(
        &self,
        request: &PhotoScanRequest,
    ) -> Result<PhotoAnalysis, InferenceError> {
        let resp: PhotoResponse = self.post(PHOTO_PATH, request).await?;
        let analysis = resp.into_analysis()?;
        info!(
            ai_classification = %analysis.ai_classification,
            agreement = analysis.agreement,
            "received photo analysis"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspecta_core::ClassificationCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn enhance_request() -> EnhanceRequest {
        EnhanceRequest {
            description: "Loose connection".into(),
            location: "Consumer unit".into(),
            current_code: ClassificationCode::C3,
        }
    }

    fn client_for(server: &MockServer) -> HttpInferenceClient {
        HttpInferenceClient::new(
            InferenceConfig::new(server.uri()).with_api_key(Some("anon-key".into())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn enhance_posts_request_and_parses_bundle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-observation"))
            .and(header("authorization", "Bearer anon-key"))
            .and(body_json(json!({
                "description": "Loose connection",
                "location": "Consumer unit",
                "currentCode": "C3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestedCode": "C2",
                "confidence": 0.91,
                "enhancedDescription": "Loose terminal connection at DB observed, overheating risk",
                "recommendation": "Re-terminate and torque to spec",
                "regulationRefs": [{"number": "526.1", "title": "Connections"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = client_for(&server)
            .enhance_observation(&enhance_request())
            .await
            .unwrap();
        assert_eq!(bundle.suggested_code(), ClassificationCode::C2);
        assert_eq!(bundle.recommendation(), Some("Re-terminate and torque to spec"));
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-observation"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .enhance_observation(&enhance_request())
            .await
            .unwrap_err();
        match err {
            InferenceError::Server { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/enhance-observation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestedCode": "C2",
                "confidence": 91,
                "enhancedDescription": "text"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .enhance_observation(&enhance_request())
            .await
            .unwrap_err();
        assert!(err.is_malformed(), "got {err:?}");
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyse-safety-photo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let request = PhotoScanRequest {
            photo_url: "https://example.test/p1.jpg".into(),
            inspector_classification: ClassificationCode::C3,
            location_context: "Garage".into(),
        };
        let err = client_for(&server).analyse_photo(&request).await.unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    #[tokio::test]
    async fn photo_analysis_is_validated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyse-safety-photo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aiClassification": "C3",
                "agreement": true,
                "suggestedClassification": "C2",
                "feedback": "",
                "findings": {"safetyFeatures": ["RCD present"], "concerns": [], "notVerifiable": []},
                "guidance": {"summary": "Classification consistent", "followUpChecks": []},
                "confidence": 88,
                "photoQuality": {"adequate": true, "issues": []}
            })))
            .mount(&server)
            .await;

        let request = PhotoScanRequest {
            photo_url: "https://example.test/p1.jpg".into(),
            inspector_classification: ClassificationCode::C3,
            location_context: "Garage".into(),
        };
        let analysis = client_for(&server).analyse_photo(&request).await.unwrap();
        assert!(analysis.agreement);
        assert!(analysis.suggested_classification.is_none());
        assert_eq!(analysis.findings.safety_features, vec!["RCD present".to_string()]);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            HttpInferenceClient::new(InferenceConfig::new("http://localhost:54321/functions/v1/"))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:54321/functions/v1");
    }
}
