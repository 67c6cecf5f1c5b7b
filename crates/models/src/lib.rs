use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod form;

pub use form::{ReservationForm, ValidationErrors, MAX_GUESTS, MIN_GUESTS};

// --- Status ---

/// Reservation status as reported by the backend.
///
/// The backend owns transitions; the client only requests them. Values the
/// client does not know decode to `Unrecognized` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Approved,
    RescheduleRequested,
    Cancelled,
    Unrecognized(String),
}

impl Status {
    /// Known statuses in dashboard display order.
    pub const KNOWN: [Status; 4] = [
        Status::Pending,
        Status::Approved,
        Status::RescheduleRequested,
        Status::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::RescheduleRequested => "reschedule_requested",
            Status::Cancelled => "cancelled",
            Status::Unrecognized(raw) => raw,
        }
    }

    /// Plain-text form, e.g. "reschedule requested".
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Status::Pending,
            "approved" => Status::Approved,
            "reschedule_requested" => Status::RescheduleRequested,
            "cancelled" => Status::Cancelled,
            other => Status::Unrecognized(other.to_string()),
        })
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(status) = raw.parse::<Status>();
        Ok(status)
    }
}

// --- Identity ---

/// Opaque backend identifier. The wire value may be a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReservationId(String);

impl ReservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for ReservationId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for ReservationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReservationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

// --- Reservation ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default, alias = "guest_count")]
    pub guests: Option<u32>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, alias = "special_requests")]
    pub special_request: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub proposed_date: Option<NaiveDate>,
    #[serde(default)]
    pub proposed_time: Option<String>,
    #[serde(default)]
    pub guest_confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Reservation {
    pub fn is_guest_confirmed(&self) -> bool {
        self.guest_confirmed.unwrap_or(false)
    }

    /// A staff-proposed reschedule the guest has not yet accepted.
    pub fn awaits_guest_confirmation(&self) -> bool {
        self.status == Status::RescheduleRequested && !self.is_guest_confirmed()
    }

    /// "First Last", falling back to the account name.
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.guest_name.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }

    /// Local state after the guest accepted a proposed reschedule.
    pub fn mark_reschedule_confirmed(&mut self) {
        self.status = Status::Approved;
        self.guest_confirmed = Some(true);
    }
}

// --- Request bodies ---

/// Body of `POST /api/reservations/`. Empty optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReservation {
    pub date: NaiveDate,
    pub time: String,
    pub guests: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
}

/// Body of `PATCH /api/reservations/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_time: Option<String>,
}

impl StatusUpdate {
    pub fn approve() -> Self {
        Self::to(Status::Approved)
    }

    pub fn cancel() -> Self {
        Self::to(Status::Cancelled)
    }

    pub fn to(status: Status) -> Self {
        Self {
            status,
            proposed_date: None,
            proposed_time: None,
        }
    }

    /// Staff proposal of a new date and time. Both are required.
    pub fn propose_reschedule(date: &str, time: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let proposed_date = form::check_date(date, &mut errors);
        let proposed_time = form::check_time(time, &mut errors);
        match (proposed_date, proposed_time) {
            (Some(d), Some(t)) if errors.is_empty() => Ok(Self {
                status: Status::RescheduleRequested,
                proposed_date: Some(d),
                proposed_time: Some(t),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": 7,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "mobile_number": "0400000000",
            "date": "2025-06-01",
            "time": "19:00:00",
            "guests": 4,
            "special_request": "window seat",
            "status": "pending",
            "proposed_date": null,
            "proposed_time": null,
            "guest_confirmed": null,
            "created_at": "2025-05-01T10:00:00Z"
        })
    }

    #[test]
    fn decodes_backend_reservation() {
        let r: Reservation = serde_json::from_value(sample()).unwrap();
        assert_eq!(r.id, ReservationId::from(7));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(r.guests, Some(4));
        assert_eq!(r.status, Status::Pending);
        assert!(!r.is_guest_confirmed());
        assert_eq!(r.full_name(), "Ada Lovelace");
    }

    #[test]
    fn accepts_alternate_field_spellings() {
        let r: Reservation = serde_json::from_value(json!({
            "id": "abc",
            "date": "2025-06-01",
            "time": "19:00",
            "guest_count": 2,
            "special_requests": "birthday",
            "status": "approved"
        }))
        .unwrap();
        assert_eq!(r.id.as_str(), "abc");
        assert_eq!(r.guests, Some(2));
        assert_eq!(r.special_request.as_deref(), Some("birthday"));
    }

    #[test]
    fn unknown_status_does_not_fail_decoding() {
        let mut value = sample();
        value["status"] = json!("seated");
        let r: Reservation = serde_json::from_value(value).unwrap();
        assert_eq!(r.status, Status::Unrecognized("seated".into()));
        assert_eq!(serde_json::to_value(&r.status).unwrap(), json!("seated"));
    }

    #[test]
    fn status_wire_names() {
        for status in Status::KNOWN {
            let encoded = serde_json::to_value(&status).unwrap();
            let decoded: Status = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, status);
        }
        assert_eq!(Status::RescheduleRequested.display_name(), "reschedule requested");
    }

    #[test]
    fn awaiting_confirmation_only_for_unconfirmed_reschedules() {
        let mut r: Reservation = serde_json::from_value(sample()).unwrap();
        assert!(!r.awaits_guest_confirmation());

        r.status = Status::RescheduleRequested;
        assert!(r.awaits_guest_confirmation());

        r.mark_reschedule_confirmed();
        assert_eq!(r.status, Status::Approved);
        assert!(r.is_guest_confirmed());
        assert!(!r.awaits_guest_confirmation());
    }

    #[test]
    fn full_name_falls_back_to_account_name() {
        let mut r: Reservation = serde_json::from_value(sample()).unwrap();
        r.first_name = None;
        r.last_name = Some("  ".into());
        r.guest_name = Some("ada99".into());
        assert_eq!(r.full_name(), "ada99");
    }

    #[test]
    fn status_update_bodies() {
        assert_eq!(
            serde_json::to_value(StatusUpdate::approve()).unwrap(),
            json!({ "status": "approved" })
        );

        let update = StatusUpdate::propose_reschedule("2025-06-02", "20:30").unwrap();
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({
                "status": "reschedule_requested",
                "proposed_date": "2025-06-02",
                "proposed_time": "20:30"
            })
        );
    }

    #[test]
    fn reschedule_proposal_needs_date_and_time() {
        let errors = StatusUpdate::propose_reschedule("2025-06-02", "").unwrap_err();
        assert_eq!(errors.get("time"), Some("Please select a time"));
        assert!(errors.get("date").is_none());
    }
}
