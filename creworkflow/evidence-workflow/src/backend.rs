use crate::errors::WorkflowError;
use crate::models::{
    ChallanRequest, DetectionOutcome, IssuedChallan, LookupOutcome, MediaKind, NotificationOutcome,
    UploadedEvidence,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// The back-office operations the workflow drives.
#[async_trait]
pub trait ChallanBackend: Send + Sync {
    async fn upload_evidence(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<UploadedEvidence, WorkflowError>;

    async fn process_evidence(
        &self,
        evidence: &UploadedEvidence,
        kind: MediaKind,
    ) -> Result<DetectionOutcome, WorkflowError>;

    async fn lookup_vehicle(&self, plate_number: &str) -> Result<LookupOutcome, WorkflowError>;

    async fn create_challan(&self, request: &ChallanRequest)
        -> Result<IssuedChallan, WorkflowError>;

    async fn send_sms(&self, challan_id: &str) -> Result<NotificationOutcome, WorkflowError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<Value, WorkflowError> {
        let req = self.authorize(self.http.post(self.url(path)).json(body));
        let resp = req.send().await.map_err(|e| transport(operation, e))?;
        decode(operation, resp).await
    }
}

fn transport(operation: &'static str, err: reqwest::Error) -> WorkflowError {
    WorkflowError::Transport {
        operation,
        message: err.to_string(),
    }
}

async fn decode(operation: &'static str, resp: reqwest::Response) -> Result<Value, WorkflowError> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body["error"]
            .as_str()
            .unwrap_or("request failed")
            .to_string();
        return Err(WorkflowError::Backend {
            operation,
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

fn field<T: DeserializeOwned>(
    operation: &'static str,
    body: &Value,
    pointer: &str,
) -> Result<T, WorkflowError> {
    let value = body.pointer(pointer).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| WorkflowError::Transport {
        operation,
        message: format!("unexpected response field {pointer}: {e}"),
    })
}

#[async_trait]
impl ChallanBackend for HttpBackend {
    async fn upload_evidence(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<UploadedEvidence, WorkflowError> {
        let req = self
            .http
            .post(self.url("/v1/evidence"))
            .query(&[("file_name", file_name)])
            .body(bytes.to_vec());
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| transport("upload", e))?;
        let body = decode("upload", resp).await?;
        Ok(UploadedEvidence {
            queue_id: field("upload", &body, "/queue_id")?,
            public_url: field("upload", &body, "/public_url")?,
        })
    }

    async fn process_evidence(
        &self,
        evidence: &UploadedEvidence,
        kind: MediaKind,
    ) -> Result<DetectionOutcome, WorkflowError> {
        let payload = match kind {
            MediaKind::Image => json!({ "image_url": evidence.public_url, "queue_id": evidence.queue_id }),
            MediaKind::Video => json!({ "video_url": evidence.public_url, "queue_id": evidence.queue_id }),
        };
        let body = self
            .post_json("detection", "/v1/process-evidence", &payload)
            .await?;
        Ok(DetectionOutcome {
            result: body["result"].clone(),
            mock: body["mock"].as_bool().unwrap_or(false),
            processing_time_ms: body["processing_time_ms"].as_u64().unwrap_or(0),
        })
    }

    async fn lookup_vehicle(&self, plate_number: &str) -> Result<LookupOutcome, WorkflowError> {
        let body = self
            .post_json(
                "lookup",
                "/v1/vehicle-lookup",
                &json!({ "plate_number": plate_number }),
            )
            .await?;
        let data = body["data"].clone();
        Ok(LookupOutcome {
            is_test_data: data["is_test_data"].as_bool().unwrap_or(false),
            mock: body["mock"].as_bool().unwrap_or(false),
            not_found: body["not_found"].as_bool().unwrap_or(false),
            data,
        })
    }

    async fn create_challan(
        &self,
        request: &ChallanRequest,
    ) -> Result<IssuedChallan, WorkflowError> {
        let body = self
            .post_json("create-challan", "/v1/create-challan", request)
            .await?;
        Ok(IssuedChallan {
            challan_id: field("create-challan", &body, "/challan/id")?,
            challan_number: field("create-challan", &body, "/challan_number")?,
            public_url: field("create-challan", &body, "/public_url")?,
            fine_amount: field("create-challan", &body, "/fine_amount")?,
        })
    }

    async fn send_sms(&self, challan_id: &str) -> Result<NotificationOutcome, WorkflowError> {
        let body = self
            .post_json(
                "send-sms",
                "/v1/send-challan-sms",
                &json!({ "challan_id": challan_id }),
            )
            .await?;
        Ok(NotificationOutcome {
            mock: body["mock"].as_bool().unwrap_or(false),
        })
    }
}
