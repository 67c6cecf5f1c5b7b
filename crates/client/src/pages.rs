//! State held by each front-end page between renders.
//!
//! Pages never share state and never hold the session: callers pass it in
//! on every operation.

use chrono::NaiveDate;
use dinner_models::{Reservation, ReservationForm, ReservationId, StatusUpdate};
use dinner_view::{project, BookingsView, StatusGroups, Toast, Toaster, DASHBOARD_TOAST, GUEST_TOAST};
use tracing::{error, warn};

use crate::{ApiResult, ReservationClient, Session, SubmitError};

// --- Guest: my bookings ---

#[derive(Debug)]
pub struct BookingsPage {
    reservations: Vec<Reservation>,
    toaster: Toaster,
}

impl Default for BookingsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingsPage {
    pub fn new() -> Self {
        Self {
            reservations: Vec::new(),
            toaster: Toaster::new(GUEST_TOAST),
        }
    }

    /// Replace the local copy with a fresh fetch. On failure the list is
    /// emptied.
    pub async fn load(&mut self, client: &ReservationClient, session: &Session) -> ApiResult<()> {
        match client.list_reservations(session).await {
            Ok(reservations) => {
                self.reservations = reservations;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load reservations: {e}");
                self.reservations.clear();
                Err(e)
            }
        }
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn view(&self, today: NaiveDate) -> BookingsView<'_> {
        project(today, &self.reservations)
    }

    /// Accept a proposed reschedule. Local state is patched only once the
    /// backend has accepted; there is no re-fetch.
    pub async fn confirm_reschedule(
        &mut self,
        client: &ReservationClient,
        session: &Session,
        id: &ReservationId,
    ) -> ApiResult<()> {
        if let Err(e) = client.confirm_reschedule(session, id).await {
            error!("Reschedule confirmation failed: {e}");
            return Err(e);
        }

        match self.reservations.iter_mut().find(|r| &r.id == id) {
            Some(r) => r.mark_reschedule_confirmed(),
            None => warn!("Confirmed reservation {id} is not in the local list"),
        }
        self.toaster.success("✅ Reservation confirmed!");
        Ok(())
    }

    pub fn toast(&self) -> Option<Toast> {
        self.toaster.current()
    }
}

// --- Guest: booking form ---

#[derive(Debug)]
pub struct BookingForm {
    pub fields: ReservationForm,
    toaster: Toaster,
}

impl BookingForm {
    pub fn new(fields: ReservationForm) -> Self {
        Self {
            fields,
            toaster: Toaster::new(GUEST_TOAST),
        }
    }

    /// Validate, then send exactly one create request. Invalid input never
    /// reaches the network. The form is reset after a successful submit.
    pub async fn submit(
        &mut self,
        client: &ReservationClient,
        session: &Session,
    ) -> Result<Reservation, SubmitError> {
        let body = self.fields.validate()?;
        let created = client
            .create_reservation(session, &body)
            .await
            .inspect_err(|e| error!("Reservation failed: {e}"))?;

        self.fields = ReservationForm::default();
        self.toaster
            .success("Reservation submitted successfully! Redirecting to your bookings page.");
        Ok(created)
    }

    pub fn toast(&self) -> Option<Toast> {
        self.toaster.current()
    }
}

// --- Staff dashboard ---

#[derive(Debug)]
pub struct DashboardPage {
    groups: StatusGroups,
    load_error: Option<String>,
    toaster: Toaster,
}

impl Default for DashboardPage {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardPage {
    pub fn new() -> Self {
        Self {
            groups: StatusGroups::default(),
            load_error: None,
            toaster: Toaster::new(DASHBOARD_TOAST),
        }
    }

    /// Fetch the server-side grouping. A failed load keeps whatever was shown
    /// before and records an error line.
    pub async fn load(&mut self, client: &ReservationClient, session: &Session) -> ApiResult<()> {
        match client.dashboard_data(session).await {
            Ok(groups) => {
                self.groups = groups;
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load dashboard: {e}");
                self.load_error = Some("Failed to load reservations.".to_string());
                Err(e)
            }
        }
    }

    pub fn groups(&self) -> &StatusGroups {
        &self.groups
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Request a transition. The backend decides whether it is legal. On
    /// success the whole dashboard is re-fetched; on failure nothing local
    /// changes and an error toast is raised.
    pub async fn update_status(
        &mut self,
        client: &ReservationClient,
        session: &Session,
        id: &ReservationId,
        update: &StatusUpdate,
    ) -> ApiResult<()> {
        if let Err(e) = client.update_status(session, id, update).await {
            error!("Status update of {id} failed: {e}");
            self.toaster.error("Status update failed.");
            return Err(e);
        }
        self.toaster
            .show(toast_kind_for(update), format!("Updated to {}", update.status.display_name()));
        self.load(client, session).await
    }

    pub fn toast(&self) -> Option<Toast> {
        self.toaster.current()
    }

    pub fn dismiss_toast(&mut self) {
        self.toaster.dismiss();
    }
}

fn toast_kind_for(update: &StatusUpdate) -> dinner_view::ToastKind {
    use dinner_models::Status;
    use dinner_view::ToastKind;

    match update.status {
        Status::Approved => ToastKind::Success,
        Status::Cancelled => ToastKind::Error,
        Status::Pending | Status::RescheduleRequested | Status::Unrecognized(_) => ToastKind::Info,
    }
}
