// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use log::error;
use std::fmt;
use std::net::IpAddr;

use crate::models::user::SessionUser;
use crate::storage::StorageError;
use crate::users::{AccountError, UserRegistry};

pub type RefreshLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    NotSignedIn,
    AdminOnly,
    DuplicateServerId(String),
    Account(AccountError),
    Storage(StorageError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::NotSignedIn => write!(f, "Sign in to continue"),
            Self::AdminOnly => write!(f, "Admin access required"),
            Self::DuplicateServerId(id) => write!(f, "Duplicate server id: {}", id),
            Self::Account(e) => write!(f, "{}", e),
            Self::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => HttpResponse::TooManyRequests().body(self.to_string()),
            Self::NotSignedIn => HttpResponse::Unauthorized().body(self.to_string()),
            Self::AdminOnly => HttpResponse::Forbidden().body(self.to_string()),
            Self::Account(AccountError::UsernameTaken) => {
                HttpResponse::Conflict().body(self.to_string())
            }
            Self::Account(AccountError::Storage(_)) | Self::Storage(_) => {
                error!("{}", self);
                HttpResponse::InternalServerError().body(self.to_string())
            }
            _ => HttpResponse::BadRequest().body(self.to_string()),
        }
    }
}

impl From<AccountError> for RequestError {
    fn from(e: AccountError) -> Self {
        Self::Account(e)
    }
}

impl From<StorageError> for RequestError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

pub fn peer_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    req.peer_addr()
        .map(|addr| addr.ip())
        .ok_or(RequestError::MissingPeerIP)
}

pub fn require_user(users: &UserRegistry) -> Result<SessionUser, RequestError> {
    users.current_user().ok_or(RequestError::NotSignedIn)
}

pub fn require_admin(users: &UserRegistry) -> Result<SessionUser, RequestError> {
    let user = require_user(users)?;
    if !user.is_admin() {
        return Err(RequestError::AdminOnly);
    }
    Ok(user)
}
