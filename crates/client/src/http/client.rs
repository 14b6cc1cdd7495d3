//! Placify API client.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::error::{ApiError, ErrorResponse};
use super::interceptor::{self, Disposition, LogRedirect, LoginRedirect};
use super::response::{ApiResponse, RequestBody, RequestOptions};
use crate::config::ClientConfig;
use crate::session::SessionState;

/// Preconfigured HTTP client for the Placify API.
///
/// Every request gets the stored bearer token attached. A 401 from the server
/// clears the session and triggers the [`LoginRedirect`] hook before the
/// error is returned.
///
/// Cheap to clone; clones share the connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    login_url: String,
    session: SessionState,
    redirect: Arc<dyn LoginRedirect>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("login_url", &self.inner.login_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client whose login redirect only logs.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionState) -> Result<Self, ApiError> {
        Self::with_redirect(config, session, Arc::new(LogRedirect))
    }

    /// Create a client with a custom login redirect hook.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client fails to build.
    pub fn with_redirect(
        config: &ClientConfig,
        session: SessionState,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
                login_url: config.login_url(),
                session,
                redirect,
            }),
        })
    }

    /// Session backing this client.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        }
    }

    /// GET `path` and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    /// GET with extra headers or query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty, options)
            .await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        self.request(Method::POST, path, body, RequestOptions::default())
            .await
    }

    /// PATCH a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        self.request(Method::PATCH, path, body, RequestOptions::default())
            .await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    /// POST a `multipart/form-data` body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(
            Method::POST,
            path,
            RequestBody::Multipart(form),
            RequestOptions::default(),
        )
        .await
    }

    /// PATCH a `multipart/form-data` body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(
            Method::PATCH,
            path,
            RequestBody::Multipart(form),
            RequestOptions::default(),
        )
        .await
    }

    /// Send a request and decode a successful body as `T`.
    ///
    /// An empty success body decodes from `null`, so `Value` and `Option<_>`
    /// accept it.
    ///
    /// # Errors
    ///
    /// Returns an `ApiError` describing the failure. On `Unauthorized` the
    /// session has already been cleared and the login redirect fired.
    #[instrument(skip(self, body, options))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        match self.send(method.clone(), path, body, &options).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if interceptor::inspect_error(&method, path, &err) == Disposition::InvalidateSession
                {
                    self.inner.session.logout();
                    self.inner.redirect.redirect_to_login(&self.inner.login_url);
                }
                Err(err)
            }
        }
    }

    /// Build the outgoing request without sending it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the URL or body is invalid.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<reqwest::Request, ApiError> {
        let mut url = Url::parse(&self.url(path))
            .map_err(|e| ApiError::Request(format!("invalid URL for {path}: {e}")))?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let builder = self
            .inner
            .client
            .request(method, url)
            .headers(options.headers.clone());
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        interceptor::inject_auth(builder, &self.inner.session)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = self.build_request(method, path, body, options)?;
        let response = self
            .inner
            .client
            .execute(request)
            .await
            .map_err(ApiError::NoResponse)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_response(ErrorResponse::read(response).await));
        }

        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(ApiError::NoResponse)?;
        debug!(%status, bytes = bytes.len(), "Response received");

        Ok(ApiResponse {
            status,
            headers,
            data: decode_body(status, &bytes)?,
        })
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Request(format!("failed to serialize body: {e}")))
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> Result<T, ApiError> {
    let decoded = if bytes.is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(bytes)
    };
    decoded.map_err(|e| ApiError::Parse(format!("{status}: {e}")))
}
