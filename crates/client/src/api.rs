use std::collections::BTreeMap;
use std::time::Duration;

use dinner_models::{NewReservation, Reservation, ReservationId, StatusUpdate};
use dinner_view::StatusGroups;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{ApiError, ApiResult, Session};

// --- Wire types ---

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
}

/// `GET /api/reservations/` answers either with a bare list or a paginated
/// envelope. Both collapse to a list here and nowhere else.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReservationList {
    Bare(Vec<Reservation>),
    Paged {
        #[serde(default)]
        results: Vec<Reservation>,
    },
}

impl From<ReservationList> for Vec<Reservation> {
    fn from(list: ReservationList) -> Self {
        match list {
            ReservationList::Bare(items) => items,
            ReservationList::Paged { results } => results,
        }
    }
}

// --- Client ---

/// REST client for the reservation backend.
///
/// No retries and no caching: every call is exactly one request.
#[derive(Debug, Clone)]
pub struct ReservationClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReservationClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Exchange credentials for a bearer token. Any rejection is `Auth`;
    /// bad credentials and a broken backend are not told apart.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let body = TokenRequest {
            username: username.trim(),
            password: password.trim(),
        };
        let resp = self
            .http
            .post(self.url("/api/token/"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "login rejected");
            return Err(ApiError::Auth);
        }

        let token: TokenResponse = decode(resp).await?;
        info!("Logged in as {}", body.username);
        Ok(Session::new(token.access))
    }

    pub async fn list_reservations(&self, session: &Session) -> ApiResult<Vec<Reservation>> {
        let req = self.http.get(self.url("/api/reservations/"));
        let resp = send(req, session, ApiError::Load).await?;
        let list: ReservationList = decode(resp).await?;
        let reservations: Vec<Reservation> = list.into();
        info!("Fetched {} reservations", reservations.len());
        Ok(reservations)
    }

    pub async fn create_reservation(
        &self,
        session: &Session,
        reservation: &NewReservation,
    ) -> ApiResult<Reservation> {
        let req = self
            .http
            .post(self.url("/api/reservations/"))
            .json(reservation);
        let resp = send(req, session, ApiError::Submission).await?;
        let created: Reservation = decode(resp).await?;
        info!("Reservation {} created for {} at {}", created.id, created.date, created.time);
        Ok(created)
    }

    pub async fn update_status(
        &self,
        session: &Session,
        id: &ReservationId,
        update: &StatusUpdate,
    ) -> ApiResult<()> {
        let req = self
            .http
            .patch(self.url(&format!("/api/reservations/{id}/")))
            .json(update);
        send(req, session, ApiError::Transition).await?;
        info!("Reservation {id} updated to {}", update.status);
        Ok(())
    }

    pub async fn confirm_reschedule(&self, session: &Session, id: &ReservationId) -> ApiResult<()> {
        let req = self
            .http
            .patch(self.url(&format!("/api/reservations/{id}/confirm_reschedule/")));
        send(req, session, ApiError::Transition).await?;
        info!("Reschedule of reservation {id} confirmed");
        Ok(())
    }

    /// Staff view, grouped by status on the server.
    pub async fn dashboard_data(&self, session: &Session) -> ApiResult<StatusGroups> {
        let req = self.http.get(self.url("/api/dashboard-data/"));
        let resp = send(req, session, ApiError::Load).await?;
        let named: BTreeMap<String, Vec<Reservation>> = decode(resp).await?;
        let groups = StatusGroups::from_named(named);
        info!("Fetched dashboard data ({} reservations)", groups.counts().total());
        Ok(groups)
    }
}

// --- Helpers ---

/// Send with the bearer header. 401 means the session is gone; any other
/// rejection is wrapped by `rejected`.
async fn send(
    req: RequestBuilder,
    session: &Session,
    rejected: fn(String) -> ApiError,
) -> ApiResult<Response> {
    let resp = req.bearer_auth(session.token()).send().await?;
    let status = resp.status();
    debug!(%status, url = %resp.url(), "response");

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Auth);
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        warn!(%status, body = %text, "request rejected");
        let detail = if text.is_empty() { status.to_string() } else { text };
        return Err(rejected(detail));
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
