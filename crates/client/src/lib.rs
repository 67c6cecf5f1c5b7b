//! Client side of the dinner reservation backend: session handling, the REST
//! client, and the per-page state the front end renders from.

mod api;
mod error;
mod pages;
mod session;

pub use api::ReservationClient;
pub use error::{ApiError, ApiResult, SubmitError};
pub use pages::{BookingForm, BookingsPage, DashboardPage};
pub use session::{Session, TokenStore};
