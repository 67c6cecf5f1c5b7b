use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::NewReservation;

pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 12;

/// One message per offending field, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summarize(.fields))]
pub struct ValidationErrors {
    fields: Vec<(&'static str, String)>,
}

fn summarize(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Raw guest-form input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct ReservationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub date: String,
    pub time: String,
    pub guests: String,
    pub special_request: String,
}

impl ReservationForm {
    /// Schema checks only. Conflicts such as double bookings are the
    /// backend's call.
    pub fn validate(&self) -> Result<NewReservation, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let date = check_date(&self.date, &mut errors);
        let time = check_time(&self.time, &mut errors);
        let guests = check_guests(&self.guests, &mut errors);

        match (date, time, guests) {
            (Some(date), Some(time), Some(guests)) if errors.is_empty() => Ok(NewReservation {
                date,
                time,
                guests,
                first_name: optional(&self.first_name),
                last_name: optional(&self.last_name),
                email: optional(&self.email),
                mobile_number: optional(&self.mobile_number),
                special_request: optional(&self.special_request),
            }),
            _ => Err(errors),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn check_date(raw: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("date", "Please select a date");
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.add("date", "Please enter a valid date");
            None
        }
    }
}

pub(crate) fn check_time(raw: &str, errors: &mut ValidationErrors) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("time", "Please select a time");
        return None;
    }
    let parses = NaiveTime::parse_from_str(raw, "%H:%M").is_ok()
        || NaiveTime::parse_from_str(raw, "%H:%M:%S").is_ok();
    if parses {
        Some(raw.to_string())
    } else {
        errors.add("time", "Please enter a valid time");
        None
    }
}

fn check_guests(raw: &str, errors: &mut ValidationErrors) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("guests", "Number of guests is required");
        return None;
    }
    let Ok(count) = raw.parse::<i64>() else {
        errors.add("guests", "Number of guests must be a whole number");
        return None;
    };
    if !(i64::from(MIN_GUESTS)..=i64::from(MAX_GUESTS)).contains(&count) {
        errors.add(
            "guests",
            format!("Number of guests must be between {MIN_GUESTS} and {MAX_GUESTS}"),
        );
        return None;
    }
    u32::try_from(count).ok()
}
