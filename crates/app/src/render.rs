// Plain-text rendering of the page state. Everything returns a String so the
// caller decides where it goes.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveTime};
use dinner_client::DashboardPage;
use dinner_models::{Reservation, Status};
use dinner_view::{BookingsView, Toast, ToastKind};

const DAY_FORMAT: &str = "%d-%m-%Y";

fn day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// "HH:MM" from either "HH:MM" or "HH:MM:SS"; anything else is shown as is.
fn clock(time: &str) -> String {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| time.to_string())
}

fn or_dash(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "—",
    }
}

pub fn toast(toast: Option<&Toast>) -> String {
    match toast {
        Some(t) => {
            let marker = match t.kind {
                ToastKind::Success => "[ok]",
                ToastKind::Error => "[error]",
                ToastKind::Info => "[info]",
            };
            format!("{marker} {}\n", t.message)
        }
        None => String::new(),
    }
}

// --- My bookings ---

pub fn bookings(view: &BookingsView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "My Reservations");
    let _ = writeln!(out, "{}", "=".repeat(60));

    if view.is_empty() {
        let _ = writeln!(out, "No bookings found.");
        return out;
    }

    for (heading, items, is_past) in [
        ("Upcoming Bookings", &view.upcoming, false),
        ("Past Bookings", &view.past, true),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}");
        let _ = writeln!(out, "{}", "-".repeat(60));
        for r in items.iter() {
            booking(&mut out, r, is_past);
        }
    }
    out
}

fn booking(out: &mut String, r: &Reservation, is_past: bool) {
    let past_marker = if is_past { " (past)" } else { "" };
    let _ = writeln!(
        out,
        "#{:<6} {} at {:<6} [{}]{past_marker}",
        r.id,
        day(r.date),
        clock(&r.time),
        r.status.display_name()
    );
    let _ = writeln!(out, "        Name:   {}", or_dash(Some(&r.full_name())));
    let _ = writeln!(out, "        Email:  {}", or_dash(r.email.as_deref()));
    let _ = writeln!(out, "        Mobile: {}", or_dash(r.mobile_number.as_deref()));
    if let Some(guests) = r.guests {
        let _ = writeln!(out, "        Guests: {guests}");
    }
    if let Some(note) = r.special_request.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = writeln!(out, "        Note:   {note}");
    }
    if r.awaits_guest_confirmation() {
        let proposed = match (r.proposed_date, r.proposed_time.as_deref()) {
            (Some(d), Some(t)) => format!("{} at {}", day(d), clock(t)),
            _ => "to be announced".to_string(),
        };
        let _ = writeln!(out, "        🕑 Proposed new time: {proposed}");
        let _ = writeln!(out, "           Run `dinner confirm {}` to accept it.", r.id);
    }
}

// --- Staff dashboard ---

pub fn dashboard(page: &DashboardPage) -> String {
    let mut out = String::new();
    let groups = page.groups();
    let counts = groups.counts();

    let _ = writeln!(out, "Dinner Dashboard");
    let _ = writeln!(out, "{}", "=".repeat(96));
    let _ = writeln!(
        out,
        "Total {}   Pending {}   Confirmed {}   Reschedule {}   Cancelled {}",
        counts.total(),
        counts.pending,
        counts.approved,
        counts.reschedule_requested,
        counts.cancelled
    );
    if let Some(err) = page.load_error() {
        let _ = writeln!(out, "{err}");
    }

    for (label, items) in groups.sections() {
        let _ = writeln!(out, "\n{label}");
        if items.is_empty() {
            let _ = writeln!(out, "  No reservations found.");
            continue;
        }
        let _ = writeln!(
            out,
            "  {:<8} {:<12} {:<6} {:<6} {:<24} {:<36} {}",
            "ID", "Date", "Time", "Guests", "Guest", "Contact", "Notes"
        );
        let _ = writeln!(out, "  {}", "-".repeat(110));
        for r in items {
            let _ = writeln!(
                out,
                "  {:<8} {:<12} {:<6} {:<6} {:<24} {:<36} {}",
                r.id.as_str(),
                r.date.to_string(),
                clock(&r.time),
                r.guests.map(|g| g.to_string()).unwrap_or_default(),
                or_dash(Some(&r.full_name())),
                format!("{} | {}", or_dash(r.email.as_deref()), or_dash(r.mobile_number.as_deref())),
                staff_notes(r),
            );
        }
    }
    out
}

fn staff_notes(r: &Reservation) -> String {
    let mut notes = Vec::new();
    if let (Some(d), Some(t)) = (r.proposed_date, r.proposed_time.as_deref()) {
        notes.push(format!("Proposed: {d} @ {}", clock(t)));
    }
    if r.status == Status::Approved && r.is_guest_confirmed() {
        notes.push("✅ Guest confirmed".to_string());
    }
    if let Status::Unrecognized(raw) = &r.status {
        notes.push(format!("status: {raw}"));
    }
    notes.join("; ")
}
