use std::borrow::Borrow;

use chrono::NaiveDate;
use dinner_models::{Reservation, Status};

const UNRECOGNIZED_LABEL: &str = "• Unrecognized status";

/// Dashboard section heading for a status.
pub fn status_label(status: &Status) -> &'static str {
    match status {
        Status::Pending => "🕗 Pending",
        Status::Approved => "✅ Confirmed",
        Status::RescheduleRequested => "📅 Reschedule Requested",
        Status::Cancelled => "❌ Cancelled",
        Status::Unrecognized(_) => UNRECOGNIZED_LABEL,
    }
}

/// Ascending by date. Equal dates keep their input order.
pub fn sort_by_date(reservations: &[Reservation]) -> Vec<&Reservation> {
    let mut sorted: Vec<&Reservation> = reservations.iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

/// The guest's "my bookings" page.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingsView<'a> {
    pub sorted: Vec<&'a Reservation>,
    /// Dated today or later.
    pub upcoming: Vec<&'a Reservation>,
    pub past: Vec<&'a Reservation>,
}

impl BookingsView<'_> {
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

pub fn project(today: NaiveDate, reservations: &[Reservation]) -> BookingsView<'_> {
    let sorted = sort_by_date(reservations);
    let (upcoming, past): (Vec<_>, Vec<_>) = sorted.iter().copied().partition(|r| r.date >= today);
    BookingsView {
        sorted,
        upcoming,
        past,
    }
}

// --- Grouping ---

/// Reservations bucketed by status, input order preserved per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusGroups<T = Reservation> {
    pub pending: Vec<T>,
    pub approved: Vec<T>,
    pub reschedule_requested: Vec<T>,
    pub cancelled: Vec<T>,
    pub unrecognized: Vec<T>,
}

impl<T> Default for StatusGroups<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            approved: Vec::new(),
            reschedule_requested: Vec::new(),
            cancelled: Vec::new(),
            unrecognized: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub reschedule_requested: usize,
    pub cancelled: usize,
    pub unrecognized: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.reschedule_requested + self.cancelled + self.unrecognized
    }
}

impl<T> StatusGroups<T> {
    pub fn get(&self, status: &Status) -> &[T] {
        match status {
            Status::Pending => &self.pending,
            Status::Approved => &self.approved,
            Status::RescheduleRequested => &self.reschedule_requested,
            Status::Cancelled => &self.cancelled,
            Status::Unrecognized(_) => &self.unrecognized,
        }
    }

    fn bucket_mut(&mut self, status: &Status) -> &mut Vec<T> {
        match status {
            Status::Pending => &mut self.pending,
            Status::Approved => &mut self.approved,
            Status::RescheduleRequested => &mut self.reschedule_requested,
            Status::Cancelled => &mut self.cancelled,
            Status::Unrecognized(_) => &mut self.unrecognized,
        }
    }

    /// Every known status in display order, empty or not, then the
    /// unrecognized bucket if anything landed there.
    pub fn sections(&self) -> Vec<(&'static str, &[T])> {
        let mut sections: Vec<(&'static str, &[T])> = Status::KNOWN
            .iter()
            .map(|s| (status_label(s), self.get(s)))
            .collect();
        if !self.unrecognized.is_empty() {
            sections.push((UNRECOGNIZED_LABEL, &self.unrecognized));
        }
        sections
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            pending: self.pending.len(),
            approved: self.approved.len(),
            reschedule_requested: self.reschedule_requested.len(),
            cancelled: self.cancelled.len(),
            unrecognized: self.unrecognized.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

impl StatusGroups<Reservation> {
    /// Build from a server-side grouping keyed by status name. The key wins
    /// over each record's own status field.
    pub fn from_named<I>(named: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Reservation>)>,
    {
        let mut groups = Self::default();
        for (name, items) in named {
            let Ok(status) = name.parse::<Status>();
            groups.bucket_mut(&status).extend(items);
        }
        groups
    }

    pub fn find(&self, id: &dinner_models::ReservationId) -> Option<&Reservation> {
        [
            &self.pending,
            &self.approved,
            &self.reschedule_requested,
            &self.cancelled,
            &self.unrecognized,
        ]
        .into_iter()
        .flatten()
        .find(|r| &r.id == id)
    }
}

impl<T: Borrow<Reservation>> FromIterator<T> for StatusGroups<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut groups = Self::default();
        for item in iter {
            let status = item.borrow().status.clone();
            groups.bucket_mut(&status).push(item);
        }
        groups
    }
}
