//! View-model projection for reservation lists and the toast notifier the
//! pages share.

mod projector;
mod toast;

pub use projector::{project, sort_by_date, status_label, BookingsView, StatusCounts, StatusGroups};
pub use toast::{Toast, ToastKind, Toaster, DASHBOARD_TOAST, GUEST_TOAST};
