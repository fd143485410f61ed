use crate::http::ApiError;
use std::fmt;

/// Transient message shown to the user when an operation fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    NoConnection,
    Failure(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::NoConnection => {
                write!(f, "No Internet Connection. Please check your network.")
            }
            Notification::Failure(message) => write!(f, "Something went wrong. {message}"),
        }
    }
}

impl From<&anyhow::Error> for Notification {
    fn from(e: &anyhow::Error) -> Self {
        let unreachable = e
            .chain()
            .any(|cause| matches!(cause.downcast_ref::<ApiError>(), Some(ApiError::Unreachable(_))));
        if unreachable {
            Notification::NoConnection
        } else {
            Notification::Failure(format!("{e:#}"))
        }
    }
}
