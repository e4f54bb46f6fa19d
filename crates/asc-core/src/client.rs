//! Authenticated App Store Connect client.

use crate::auth::{ApiCredential, AuthError, BearerToken, Clock, SystemClock, TokenSigner};
use crate::resources::{app_update_document, Document, NewApp, NewVersion, Resource};
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError, UreqTransport};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

pub const BASE_URL: &str = "https://api.appstoreconnect.apple.com/v1";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_UNAUTHORIZED: u16 = 401;

/// Error type for API calls.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Transport(TransportError),
    /// The server answered with an unexpected status
    Status { status: u16, body: String },
    Decode(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Transport(e) => write!(f, "{}", e),
            ApiError::Status { status, body } => write!(f, "API returned {}: {}", status, body),
            ApiError::Decode(e) => write!(f, "unexpected response body: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Auth(e) => Some(e),
            ApiError::Transport(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            ApiError::Status { .. } => None,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e)
    }
}

/// Client holding one cached token, minted lazily and replaced on refresh.
pub struct AppStoreClient<T = UreqTransport, C = SystemClock> {
    base_url: String,
    signer: TokenSigner,
    transport: T,
    clock: C,
    token: Option<BearerToken>,
}

impl AppStoreClient {
    /// Client against the live API.
    pub fn connect(credential: &ApiCredential) -> Result<Self, ApiError> {
        Self::with_parts(credential, UreqTransport::new(), SystemClock)
    }
}

impl<T: Transport, C: Clock> AppStoreClient<T, C> {
    pub fn with_parts(
        credential: &ApiCredential,
        transport: T,
        clock: C,
    ) -> Result<Self, ApiError> {
        Ok(AppStoreClient {
            base_url: BASE_URL.to_string(),
            signer: TokenSigner::new(credential)?,
            transport,
            clock,
            token: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn refresh_token(&mut self) -> Result<String, ApiError> {
        let token = self.signer.mint(self.clock.now())?;
        let authorization = token.authorization();
        self.token = Some(token);
        Ok(authorization)
    }

    fn authorization(&mut self) -> Result<String, ApiError> {
        let now = self.clock.now();
        if let Some(token) = &self.token {
            if !token.is_expired(now) {
                return Ok(token.authorization());
            }
        }
        self.refresh_token()
    }

    /// Send a request, re-signing and resending once if the token is rejected.
    pub fn send(&mut self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let authorization = self.authorization()?;
        let response = self.transport.send(request, &authorization)?;
        if response.status != STATUS_UNAUTHORIZED {
            return Ok(response);
        }

        log::info!("token rejected for {} {}; re-signing", request.method, request.url);
        let authorization = self.refresh_token()?;
        Ok(self.transport.send(request, &authorization)?)
    }

    fn call<D: DeserializeOwned>(
        &mut self,
        request: &ApiRequest,
        expected: u16,
    ) -> Result<D, ApiError> {
        let response = self.send(request)?;
        if response.status != expected {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }
        let document: Document<D> = serde_json::from_str(&response.body).map_err(ApiError::Decode)?;
        Ok(document.data)
    }

    pub fn list_apps(&mut self) -> Result<Vec<Resource>, ApiError> {
        let request = ApiRequest::get(self.url("apps"));
        self.call(&request, STATUS_OK)
    }

    /// The app registered under `bundle_id`, if any.
    pub fn app_by_bundle_id(&mut self, bundle_id: &str) -> Result<Option<Resource>, ApiError> {
        let request = ApiRequest::get(self.url("apps")).with_query("filter[bundleId]", bundle_id);
        let apps: Vec<Resource> = self.call(&request, STATUS_OK)?;
        Ok(apps.into_iter().next())
    }

    pub fn list_builds(&mut self, app_id: &str) -> Result<Vec<Resource>, ApiError> {
        let request = ApiRequest::get(self.url(&format!("apps/{}/builds", app_id)));
        self.call(&request, STATUS_OK)
    }

    pub fn create_app(&mut self, app: &NewApp) -> Result<Resource, ApiError> {
        let request = ApiRequest::post(self.url("apps"), app.to_document());
        self.call(&request, STATUS_CREATED)
    }

    pub fn create_version(&mut self, version: &NewVersion) -> Result<Resource, ApiError> {
        let request = ApiRequest::post(self.url("appStoreVersions"), version.to_document());
        self.call(&request, STATUS_CREATED)
    }

    pub fn update_app(
        &mut self,
        app_id: &str,
        attributes: &Map<String, Value>,
    ) -> Result<Resource, ApiError> {
        let request = ApiRequest::patch(
            self.url(&format!("apps/{}", app_id)),
            app_update_document(app_id, attributes),
        );
        self.call(&request, STATUS_OK)
    }
}

impl<T, C> fmt::Debug for AppStoreClient<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStoreClient")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}
