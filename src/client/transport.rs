use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ClientError;

/// One HTTP exchange: method, path relative to the server root, optional
/// bearer token and optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

/// Status plus decoded JSON body. Non-2xx responses come back as values too,
/// so the session controller can react to a 401 instead of losing it inside
/// a transport error.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server's `{"message": …}` field, or a placeholder when absent.
    pub fn message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Executes one request. Production code uses [`HttpTransport`]; tests swap
/// in a scripted implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// `reqwest`-backed transport against a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        if base_url.is_empty() {
            return Err(ClientError::Config("base_url is empty".into()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self.http.request(req.method, self.url(&req.path));
        if let Some(token) = &req.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        // Error responses still carry a JSON message body; anything that is
        // not JSON (an empty body, a proxy error page) reads as null.
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders_fill_the_fields() {
        let req = ApiRequest::post("/auth/login")
            .json(serde_json::json!({"email": "a@b.c"}))
            .bearer("tok");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/auth/login");
        assert_eq!(req.bearer.as_deref(), Some("tok"));
        assert_eq!(req.body.unwrap()["email"], "a@b.c");

        let req = ApiRequest::get("/plans");
        assert_eq!(req.method, Method::GET);
        assert!(req.bearer.is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let transport = HttpTransport::new("http://localhost:8000/").unwrap();
        assert_eq!(
            transport.url("/my-subscription"),
            "http://localhost:8000/my-subscription"
        );
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            HttpTransport::new(""),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn response_message_falls_back_when_body_has_none() {
        let resp = ApiResponse {
            status: 401,
            body: serde_json::json!({"message": "Invalid credentials"}),
        };
        assert_eq!(resp.message(), "Invalid credentials");
        assert!(!resp.is_success());

        let empty = ApiResponse {
            status: 502,
            body: Value::Null,
        };
        assert_eq!(empty.message(), "Unknown error");
    }
}
