use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Database Models ============

/// Represents a registered user account.
///
/// Owns zero or more chat records and sessions; deleting a user cascades
/// to both.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID, stored as text).
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC-format password hash. Never the plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Timestamp of account creation.
    pub created_at: DateTime<Utc>,
}

/// An active bearer-token session for a user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token presented in the Authorization header.
    pub token: String,
    /// Owning user id.
    pub user_id: String,
    /// Timestamp of session creation.
    pub created_at: DateTime<Utc>,
}

/// One persisted chat exchange: the user's message and whatever response
/// the pipeline produced (itinerary, clarification, or fallback text).
///
/// Append-only; exactly one record is written per accepted request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Unique identifier (UUID, stored as text).
    pub id: String,
    /// Owning user id.
    pub user_id: String,
    /// The raw message as submitted by the user.
    pub message: String,
    /// The response text returned to the user.
    pub response: String,
    /// Timestamp of the exchange.
    pub timestamp: DateTime<Utc>,
}

// ============ Domain Types ============

/// Source/destination pair extracted from a free-text travel request.
/// An empty field means the model could not confidently identify a city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRoute {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

impl ExtractedRoute {
    /// Both endpoints confidently identified.
    pub fn is_resolved(&self) -> bool {
        !self.source.is_empty() && !self.destination.is_empty()
    }
}

/// A geocoded location. Rendered as the `"lat,lng"` pair the places
/// endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A single nearby-place result, in the mapping service's own ranking order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResult {
    pub name: String,
    /// Absent when the service has no rating; rendered as `N/A`.
    pub rating: Option<f64>,
    pub vicinity: String,
}

impl std::fmt::Display for PlaceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rating {
            Some(rating) => write!(f, "- {} (Rating: {}) - {}", self.name, rating, self.vicinity),
            None => write!(f, "- {} (Rating: N/A) - {}", self.name, self.vicinity),
        }
    }
}

/// Distance and duration between two locations, as formatted by the
/// mapping service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelMetrics {
    pub distance_text: String,
    pub duration_text: String,
}

impl std::fmt::Display for TravelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Distance: {}, Duration: {}",
            self.distance_text, self.duration_text
        )
    }
}

// ============ Request/Response DTOs ============

/// Body of POST /api/v1/auth/signup and /api/v1/auth/signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response of a successful signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponse {
    pub token: String,
    pub username: String,
}

/// Body of POST /api/v1/generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub message: String,
}

/// Response of POST /api/v1/generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}
