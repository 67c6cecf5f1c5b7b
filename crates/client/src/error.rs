use dinner_models::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials, or a token the backend no longer accepts.
    #[error("Authentication failed or session expired")]
    Auth,

    /// A list or dashboard fetch came back with an error status.
    #[error("Failed to load reservations: {0}")]
    Load(String),

    /// The backend refused to create a reservation.
    #[error("Reservation was rejected: {0}")]
    Submission(String),

    /// The backend refused a status change or reschedule confirmation.
    #[error("Status change was rejected: {0}")]
    Transition(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a guest form submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Blocked before anything was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
