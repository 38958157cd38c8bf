use serde::Serialize;

use crate::cache::ModelStatus;
use crate::catalog::PlantLocation;
use crate::labels::Toxicity;

/// `{"prediction": ...}` wrapper shared by both classification routes.
#[derive(Debug, Serialize)]
pub struct PredictionResponse<T> {
    pub prediction: T,
}

impl<T> PredictionResponse<T> {
    pub fn new(prediction: T) -> Self {
        PredictionResponse { prediction }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct ToxicityPrediction {
    #[serde(rename = "type")]
    pub kind: Toxicity,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub data: Vec<PlantLocation>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        HealthResponse {
            status: "ok",
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelStatus>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toxicity_payload_shape() {
        let body = PredictionResponse::new(ToxicityPrediction {
            kind: Toxicity::Toxic,
        });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"prediction": {"type": "TOXIC"}})
        );
    }

    #[test]
    fn error_body_carries_message_and_timestamp() {
        let value = serde_json::to_value(ErrorBody::new("boom")).unwrap();
        assert_eq!(value["error"], "boom");
        assert!(value["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    }
}
