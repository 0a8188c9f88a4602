use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    admin::dto::{AdminSubscription, DashboardStats, ListResponse, StatsResponse, UserSummary},
    auth::dto::{AuthResponse, CreatedAdminResponse, PublicUser, RefreshResponse},
    plans::repo::Plan,
    subscriptions::dto::{SubscribedResponse, SubscriptionWithPlan},
};

use super::{
    error::ClientError,
    session::Session,
    store::TokenStore,
    transport::{ApiRequest, ApiResponse, HttpTransport, Transport},
};

/// Session-aware API client.
///
/// Owns the current [`Session`] and keeps it in sync with a [`TokenStore`],
/// so a restarted process resumes where it left off. Every protected call
/// goes through the same rule: if the server answers 401, exchange the
/// stored refresh token for a new access token once and retry the original
/// request once. Concurrent calls may each trigger their own refresh; the
/// refresh token stays valid either way.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    session: Mutex<Session>,
}

impl ApiClient {
    /// Build a client over explicit seams, resuming any persisted session.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        let session = match store.load() {
            Some(saved) => Session::from(saved),
            None => Session::Anonymous,
        };
        Self {
            transport,
            store,
            session: Mutex::new(session),
        }
    }

    /// Convenience constructor wiring an [`HttpTransport`] for `base_url`.
    pub fn connect(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        Ok(Self::new(Arc::new(HttpTransport::new(base_url)?), store))
    }

    pub fn session(&self) -> Session {
        self.session.lock().expect("lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.lock().expect("lock poisoned").is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.lock().expect("lock poisoned").is_admin()
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        self.session.lock().expect("lock poisoned").user().cloned()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let req = ApiRequest::post("/auth/register").json(json!({
            "name": name,
            "email": email,
            "password": password,
        }));
        let resp = check(self.transport.send(req).await?)?;
        self.install_session(resp.decode()?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let req = ApiRequest::post("/auth/login").json(json!({
            "email": email,
            "password": password,
        }));
        let resp = check(self.transport.send(req).await?)?;
        self.install_session(resp.decode()?)
    }

    /// Forget the session locally. The server keeps no session state, so
    /// there is nothing to call.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.clear().map_err(ClientError::Store)?;
        *self.session.lock().expect("lock poisoned") = Session::Anonymous;
        Ok(())
    }

    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        let req = ApiRequest::post("/auth/create-admin").json(json!({
            "name": name,
            "email": email,
            "password": password,
        }));
        let resp = check(self.send_authed(req).await?)?;
        let body: CreatedAdminResponse = resp.decode()?;
        Ok(body.user)
    }

    // ------------------------------------------------------------------
    // Plans & subscriptions
    // ------------------------------------------------------------------

    pub async fn fetch_plans(&self) -> Result<Vec<Plan>, ClientError> {
        let resp = check(self.transport.send(ApiRequest::get("/plans")).await?)?;
        resp.decode()
    }

    pub async fn subscribe(&self, plan_id: Uuid) -> Result<SubscriptionWithPlan, ClientError> {
        let req = ApiRequest::post(format!("/subscribe/{plan_id}"));
        let resp = check(self.send_authed(req).await?)?;
        let body: SubscribedResponse = resp.decode()?;
        Ok(body.subscription)
    }

    /// The caller's current subscription, or `None` when there is no active
    /// one. The server reports that empty state as 404.
    pub async fn my_subscription(&self) -> Result<Option<SubscriptionWithPlan>, ClientError> {
        let resp = self.send_authed(ApiRequest::get("/my-subscription")).await?;
        if resp.status == 404 {
            return Ok(None);
        }
        let resp = check(resp)?;
        Ok(Some(resp.decode()?))
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        let resp = check(
            self.send_authed(ApiRequest::get("/admin/dashboard-stats"))
                .await?,
        )?;
        let body: StatsResponse = resp.decode()?;
        Ok(body.data)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ClientError> {
        let resp = check(self.send_authed(ApiRequest::get("/admin/users")).await?)?;
        let body: ListResponse<UserSummary> = resp.decode()?;
        Ok(body.data)
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<AdminSubscription>, ClientError> {
        let resp = check(
            self.send_authed(ApiRequest::get("/admin/subscriptions"))
                .await?,
        )?;
        let body: ListResponse<AdminSubscription> = resp.decode()?;
        Ok(body.data)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn install_session(&self, auth: AuthResponse) -> Result<PublicUser, ClientError> {
        let session = Session::Authenticated {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            user: Some(auth.user.clone()),
        };
        if let Some(snapshot) = session.snapshot() {
            self.store.save(&snapshot).map_err(ClientError::Store)?;
        }
        *self.session.lock().expect("lock poisoned") = session;
        Ok(auth.user)
    }

    fn drop_session(&self) {
        if let Err(err) = self.store.clear() {
            warn!(?err, "could not clear stored session");
        }
        *self.session.lock().expect("lock poisoned") = Session::Anonymous;
    }

    /// Send a protected request with the current access token, refreshing
    /// and retrying exactly once on 401. A 401 on the retry is surfaced
    /// as-is; a failed refresh drops the session entirely.
    async fn send_authed(&self, req: ApiRequest) -> Result<ApiResponse, ClientError> {
        let (access, refresh) = {
            match &*self.session.lock().expect("lock poisoned") {
                Session::Authenticated {
                    access_token,
                    refresh_token,
                    ..
                } => (access_token.clone(), refresh_token.clone()),
                Session::Anonymous => return Err(ClientError::NotAuthenticated),
            }
        };

        let first = self.transport.send(req.clone().bearer(&access)).await?;
        if first.status != 401 {
            return Ok(first);
        }

        let new_access = match self.exchange_refresh_token(&refresh).await {
            Ok(token) => token,
            Err(err) => {
                debug!(%err, "token refresh failed, dropping session");
                self.drop_session();
                return Err(ClientError::SessionExpired);
            }
        };

        {
            let mut session = self.session.lock().expect("lock poisoned");
            session.set_access_token(new_access.clone());
            if let Some(snapshot) = session.snapshot() {
                if let Err(err) = self.store.save(&snapshot) {
                    warn!(?err, "could not persist refreshed access token");
                }
            }
        }

        self.transport.send(req.bearer(&new_access)).await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let req = ApiRequest::post("/auth/refresh-token").json(json!({
            "refreshToken": refresh_token,
        }));
        let resp = check(self.transport.send(req).await?)?;
        let body: RefreshResponse = resp.decode()?;
        Ok(body.access_token)
    }
}

fn check(resp: ApiResponse) -> Result<ApiResponse, ClientError> {
    if resp.is_success() {
        Ok(resp)
    } else {
        Err(ClientError::Api {
            status: resp.status,
            message: resp.message(),
        })
    }
}
