//! Typed client for the cemetery REST API

use crate::api::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
use crate::api::ReqwestTransport;
use crate::config::ApiConfig;
use crate::error::{CoreError, Result};
use crate::models::{
    CemeteryPayload, CemeteryRecord, Notice, NoticePayload, PrintPayload, PrintRecord,
};
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

const CEMETERY: &str = "/api/cemetery";
const GRAVES: &str = "/api/graves";
const NOTICES: &str = "/api/notices";
const PRINTS: &str = "/api/prints";
const UPLOAD: &str = "/api/upload";

/// Longest server text carried into an error message
const MAX_ERROR_TEXT: usize = 200;

/// Whether a request carries the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Attach when a token is stored
    IfPresent,
    /// Fail with [`CoreError::MissingToken`] when absent
    Required,
}

/// Image selected for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CoreError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// API client shared by every view.
///
/// Every request carries the API key. The bearer token comes from the
/// [`Session`] at request time, so a logout is visible immediately.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    api_key: String,
    session: Session,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, api_key: impl Into<String>, session: Session) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            session,
        }
    }

    /// Client over the reqwest transport
    pub fn from_config(config: &ApiConfig, session: Session) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeout())?;
        Ok(Self::new(Arc::new(transport), &config.api_key, session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn build(&self, method: Method, path: &str, auth: Auth, body: RequestBody) -> Result<ApiRequest> {
        let mut request = ApiRequest::new(method, path)
            .with_header(API_KEY_HEADER, &self.api_key)
            .with_body(body);

        match (self.session.token(), auth) {
            (Some(token), _) => {
                request = request.with_header("Authorization", format!("Bearer {}", token));
            }
            (None, Auth::Required) => return Err(CoreError::MissingToken),
            (None, Auth::IfPresent) => {}
        }
        Ok(request)
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path.clone();
        let method = request.method;
        let response = self.transport.send(request).await?;

        if response.is_success() {
            return Ok(response);
        }
        if response.status == 401 {
            warn!(%method, path = %path, "API rejected session token");
            return Err(CoreError::Unauthorized);
        }

        let message = error_message(&response);
        warn!(%method, path = %path, status = response.status, message = %message, "API request failed");
        Err(CoreError::Status {
            path,
            status: response.status,
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.build(Method::Get, path, Auth::IfPresent, RequestBody::Empty)?;
        let response = self.execute(request).await?;
        decode(path, &response)
    }

    /// GET that maps 404 and a `null` body to `None`
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let request = self.build(Method::Get, path, Auth::IfPresent, RequestBody::Empty)?;
        match self.execute(request).await {
            Ok(response) => decode::<Option<T>>(path, &response),
            Err(CoreError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<Value> {
        let value = serde_json::to_value(body).map_err(|source| CoreError::Decode {
            path: path.to_string(),
            message: source.to_string(),
            source,
        })?;
        let request = self.build(method, path, Auth::Required, RequestBody::Json(value))?;
        let response = self.execute(request).await?;
        debug!(%method, path = %path, "Write accepted");
        Ok(body_value(&response))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.build(Method::Delete, path, Auth::Required, RequestBody::Empty)?;
        self.execute(request).await?;
        debug!(path = %path, "Delete accepted");
        Ok(())
    }

    // ===== Cemetery records =====

    pub async fn list_cemetery(&self) -> Result<Vec<CemeteryRecord>> {
        self.get_json(CEMETERY).await
    }

    pub async fn get_cemetery(&self, id: &str) -> Result<Option<CemeteryRecord>> {
        self.get_optional(&format!("{}/{}", CEMETERY, id)).await
    }

    pub async fn create_cemetery(&self, payload: &CemeteryPayload) -> Result<Value> {
        self.write_json(Method::Post, CEMETERY, payload).await
    }

    pub async fn update_cemetery(&self, id: &str, payload: &CemeteryPayload) -> Result<Value> {
        self.write_json(Method::Put, &format!("{}/{}", CEMETERY, id), payload)
            .await
    }

    pub async fn delete_cemetery(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", CEMETERY, id)).await
    }

    /// Every defined grave slot id
    pub async fn list_graves(&self) -> Result<Vec<String>> {
        let values: Vec<Value> = self.get_json(GRAVES).await?;
        Ok(values.iter().filter_map(grave_id).collect())
    }

    // ===== Notices =====

    pub async fn list_notices(&self) -> Result<Vec<Notice>> {
        self.get_json(NOTICES).await
    }

    pub async fn get_notice(&self, id: &str) -> Result<Option<Notice>> {
        self.get_optional(&format!("{}/{}", NOTICES, id)).await
    }

    pub async fn create_notice(&self, payload: &NoticePayload) -> Result<Value> {
        self.write_json(Method::Post, NOTICES, payload).await
    }

    pub async fn update_notice(&self, id: &str, payload: &NoticePayload) -> Result<Value> {
        self.write_json(Method::Put, &format!("{}/{}", NOTICES, id), payload)
            .await
    }

    pub async fn delete_notice(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", NOTICES, id)).await
    }

    // ===== Print shop =====

    pub async fn list_prints(&self) -> Result<Vec<PrintRecord>> {
        let request = self.build(Method::Get, PRINTS, Auth::Required, RequestBody::Empty)?;
        let response = self.execute(request).await?;
        decode(PRINTS, &response)
    }

    pub async fn create_print(&self, payload: &PrintPayload) -> Result<Value> {
        self.write_json(Method::Post, PRINTS, payload).await
    }

    pub async fn update_print(&self, id: &str, payload: &PrintPayload) -> Result<Value> {
        self.write_json(Method::Put, &format!("{}/{}", PRINTS, id), payload)
            .await
    }

    pub async fn delete_print(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", PRINTS, id)).await
    }

    // ===== Upload =====

    /// Upload an image and return its public URL
    pub async fn upload(&self, image: &ImageFile) -> Result<String> {
        let body = RequestBody::Multipart {
            field: "file".to_string(),
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            bytes: image.bytes.clone(),
        };
        let request = self.build(Method::Post, UPLOAD, Auth::IfPresent, body)?;
        let response = self.execute(request).await.map_err(|e| match e {
            CoreError::Unauthorized => CoreError::Unauthorized,
            other => CoreError::Upload {
                message: other.to_string(),
            },
        })?;

        let value = body_value(&response);
        upload_url(&value).ok_or_else(|| CoreError::Upload {
            message: "response carried no url".to_string(),
        })
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: &ApiResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|source| CoreError::Decode {
        path: path.to_string(),
        message: source.to_string(),
        source,
    })
}

fn body_value(response: &ApiResponse) -> Value {
    serde_json::from_slice(&response.body).unwrap_or(Value::Null)
}

/// `{ url }` or `{ data: { url } }`
fn upload_url(value: &Value) -> Option<String> {
    value
        .get("url")
        .or_else(|| value.get("data").and_then(|d| d.get("url")))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

fn grave_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => ["graveNumber", "id", "_id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Server-supplied error text: JSON `message`/`error`, else the raw body
fn error_message(response: &ApiResponse) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(&response.body) {
        if let Some(msg) = ["message", "error"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
        {
            return msg.to_string();
        }
    }
    let text = response.text();
    let text = text.trim();
    if text.chars().count() > MAX_ERROR_TEXT {
        format!("{}...", text.chars().take(MAX_ERROR_TEXT).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptedTransport;
    use serde_json::json;

    fn client(token: Option<&str>) -> (Arc<ScriptedTransport>, ApiClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let session = match token {
            Some(t) => Session::with_token(t),
            None => Session::anonymous(),
        };
        let client = ApiClient::new(transport.clone(), "key-1", session);
        (transport, client)
    }

    #[tokio::test]
    async fn test_reads_send_api_key_and_optional_bearer() {
        let (transport, anon) = client(None);
        transport.respond(Method::Get, "/api/cemetery", 200, json!([]));
        anon.list_cemetery().await.unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.header("x-api-key"), Some("key-1"));
        assert_eq!(req.header("authorization"), None);

        let (transport, authed) = client(Some("tok"));
        transport.respond(Method::Get, "/api/cemetery", 200, json!([]));
        authed.list_cemetery().await.unwrap();
        assert_eq!(
            transport.requests()[0].header("Authorization"),
            Some("Bearer tok")
        );
    }

    #[tokio::test]
    async fn test_writes_require_token() {
        let (transport, anon) = client(None);
        let err = anon
            .create_print(&PrintPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingToken));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (transport, client) = client(Some("tok"));
        transport
            .respond(Method::Get, "/api/prints", 401, json!({"message": "jwt expired"}))
            .respond(Method::Delete, "/api/prints/p1", 500, json!({"error": "boom"}));

        assert!(client.list_prints().await.unwrap_err().is_unauthorized());

        match client.delete_print("p1").await.unwrap_err() {
            CoreError::Status {
                status, message, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_optional_maps_404_and_null() {
        let (transport, client) = client(None);
        transport.respond(Method::Get, "/api/notices/n2", 200, Value::Null);

        assert!(client.get_cemetery("missing").await.unwrap().is_none());
        assert!(client.get_notice("n2").await.unwrap().is_none());
    }

    #[test]
    fn test_image_mime_from_extension() {
        assert_eq!(ImageFile::new("grave.jpeg", vec![]).mime, "image/jpeg");
        assert_eq!(ImageFile::new("notice.WEBP", vec![]).mime, "image/webp");
        assert_eq!(
            ImageFile::new("scan", vec![]).mime,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_upload_url_shapes() {
        let (transport, client) = client(Some("tok"));
        transport
            .respond(Method::Post, "/api/upload", 200, json!({"url": "https://img/1.png"}))
            .respond(
                Method::Post,
                "/api/upload",
                200,
                json!({"data": {"url": "https://img/2.png"}}),
            );

        let image = ImageFile::new("photo.PNG", vec![1, 2, 3]);
        assert_eq!(image.mime, "image/png");
        assert_eq!(client.upload(&image).await.unwrap(), "https://img/1.png");
        assert_eq!(client.upload(&image).await.unwrap(), "https://img/2.png");

        match &transport.requests()[0].body {
            RequestBody::Multipart { field, file_name, .. } => {
                assert_eq!(field, "file");
                assert_eq!(file_name, "photo.PNG");
            }
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_without_url_fails() {
        let (transport, client) = client(Some("tok"));
        transport.respond(Method::Post, "/api/upload", 200, json!({"ok": true}));
        let err = client
            .upload(&ImageFile::new("a.jpg", vec![0]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Upload { .. }));
    }

    #[tokio::test]
    async fn test_graves_accept_mixed_shapes() {
        let (transport, client) = client(None);
        transport.respond(
            Method::Get,
            "/api/graves",
            200,
            json!(["A1", 12, {"graveNumber": "B2"}, "", null]),
        );
        assert_eq!(client.list_graves().await.unwrap(), vec!["A1", "12", "B2"]);
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message(&ApiResponse::new(502, "  Bad Gateway \n")),
            "Bad Gateway"
        );
        let long = "x".repeat(300);
        assert!(error_message(&ApiResponse::new(500, long)).ends_with("..."));
    }
}
