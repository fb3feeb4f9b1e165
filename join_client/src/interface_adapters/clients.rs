use crate::domain::errors::BackendError;
use crate::domain::identity::{Profile, Session};
use crate::domain::join::{IdentityUpgrade, JoinResult, TokenExchange, UpgradeReceipt};
use crate::domain::ports::{
    AccountAuth, AnonymousAuth, IdentityMerge, ProfileProvider, RoomGateway,
};
use crate::interface_adapters::protocol::{
    AnonymousSignInRequest, ErrorResponse, JoinRoomRequest, JoinRoomResponse, ProfileResponse,
    RegisterRequest, SessionResponse, SignInRequest, UpgradeRequest, UpgradeResponse,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

// Thin wrapper around reqwest for every backend route the join flow uses.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "backend url {base_url} cannot be a base"
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    // Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
        let res = request
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let status = res.status();

        // Keep upstream status/message so the join flow can branch on 4xx semantics.
        if !status.is_success() {
            let message = res
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|payload| payload.message);
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(res)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[async_trait]
impl AnonymousAuth for BackendClient {
    async fn sign_in_anonymously(&self, display_name: &str) -> Result<Session, BackendError> {
        let request = self
            .http
            .post(self.endpoint(&["auth", "anonymous"]))
            .json(&AnonymousSignInRequest { display_name });

        Self::send_json::<SessionResponse>(request)
            .await
            .map(Session::from)
    }
}

#[async_trait]
impl AccountAuth for BackendClient {
    async fn register(
        &self,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<Session, BackendError> {
        let request = self
            .http
            .post(self.endpoint(&["auth", "register"]))
            .json(&RegisterRequest {
                email,
                display_name,
            });

        Self::send_json::<SessionResponse>(request)
            .await
            .map(Session::from)
    }

    async fn sign_in(&self, email: &str) -> Result<Session, BackendError> {
        let request = self
            .http
            .post(self.endpoint(&["auth", "sign-in"]))
            .json(&SignInRequest { email });

        Self::send_json::<SessionResponse>(request)
            .await
            .map(Session::from)
    }
}

#[async_trait]
impl ProfileProvider for BackendClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let request = self.http.get(self.endpoint(&["profiles", user_id]));

        match Self::send_json::<ProfileResponse>(request).await {
            Ok(profile) => Ok(Some(profile.into())),
            // Unknown user: no profile rather than a failure.
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl RoomGateway for BackendClient {
    async fn exchange_token(
        &self,
        session: &Session,
        request: TokenExchange,
    ) -> Result<JoinResult, BackendError> {
        let request = self
            .http
            .post(self.endpoint(&["rooms", "join"]))
            .bearer_auth(&session.access_token)
            .json(&JoinRoomRequest {
                token: request.code.as_str(),
                display_name: request.display_name.as_deref(),
            });

        Self::send_json::<JoinRoomResponse>(request)
            .await
            .map(JoinResult::from)
    }
}

#[async_trait]
impl IdentityMerge for BackendClient {
    async fn upgrade_identity(
        &self,
        session: &Session,
        request: IdentityUpgrade,
    ) -> Result<UpgradeReceipt, BackendError> {
        let request = self
            .http
            .post(self.endpoint(&["identity", "upgrade"]))
            .bearer_auth(&session.access_token)
            .json(&UpgradeRequest {
                guest_user_id: &request.guest_user_id,
                display_name: request.display_name.as_deref(),
            });

        Self::send_json::<UpgradeResponse>(request)
            .await
            .map(UpgradeReceipt::from)
    }
}
