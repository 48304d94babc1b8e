//! Data model for Automated Communication Task (ACT) requests and responses.
//! These are the values crossing the HTTP boundary and the engine payloads;
//! a request is immutable once submitted.

use serde::{Deserialize, Serialize};

/// Metadata flags for an ACT request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActRequestMeta {
    #[serde(rename = "generate-only", skip_serializing_if = "Option::is_none")]
    pub generate_only: Option<String>,
}

/// Explicitly-typed opaque JSON document. The auxiliary payload carries
/// caller-defined configuration with no schema the service could enforce, so
/// it stays an opaque value behind a named type instead of a bare `any`
/// field in the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaquePayload(serde_json::Value);

impl OpaquePayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A request for an Automated Communication Task, keyed by the externally
/// supplied correlation id. The id is used verbatim to derive the execution
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActRequest {
    #[serde(rename = "identifierId", default)]
    pub identifier_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ActRequestMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    /// Auxiliary service configuration document
    #[serde(rename = "yang", skip_serializing_if = "Option::is_none")]
    pub payload: Option<OpaquePayload>,

    #[serde(
        rename = "activationTransactionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub activation_transaction_id: Option<String>,
}

impl ActRequest {
    /// A request carrying only the correlation id, as built from the path
    /// parameter of the dispatch endpoint
    pub fn with_identifier(identifier_id: impl Into<String>) -> Self {
        Self {
            identifier_id: identifier_id.into(),
            meta: None,
            feedback: None,
            payload: None,
            activation_transaction_id: None,
        }
    }
}

/// Error detail in an ACT response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActResponseError {
    pub message: String,
}

/// Terminal result of one ACT execution. On success `status` is the
/// composite `"<execution_id> : <run_id> : COMPLETED"` string and `error` is
/// null. The type intentionally does not enforce status/error mutual
/// exclusion; both fields are informative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActResponse {
    pub status: String,
    #[serde(default)]
    pub error: Option<ActResponseError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_wire_field_names() {
        let request = ActRequest {
            identifier_id: "REQ-42".to_string(),
            meta: Some(ActRequestMeta {
                generate_only: Some("true".to_string()),
            }),
            feedback: None,
            payload: Some(OpaquePayload::new(json!({"interface": "ge-0/0/1"}))),
            activation_transaction_id: Some("txn-7".to_string()),
        };

        let wire = serde_json::to_value(&request).expect("serializes");
        assert_eq!(wire["identifierId"], json!("REQ-42"));
        assert_eq!(wire["meta"]["generate-only"], json!("true"));
        assert_eq!(wire["yang"]["interface"], json!("ge-0/0/1"));
        assert_eq!(wire["activationTransactionId"], json!("txn-7"));
        assert!(wire.get("feedback").is_none());
    }

    #[test]
    fn response_serializes_error_as_explicit_null() {
        let response = ActResponse {
            status: "done".to_string(),
            error: None,
        };
        let wire = serde_json::to_string(&response).expect("serializes");
        assert_eq!(wire, r#"{"status":"done","error":null}"#);
    }

    #[test]
    fn response_deserializes_without_error_field() {
        let response: ActResponse =
            serde_json::from_value(json!({"status": "partial"})).expect("deserializes");
        assert_eq!(response.status, "partial");
        assert!(response.error.is_none());
    }
}
