use thiserror::Error;

/// Main error type for the travel assistant
#[derive(Error, Debug)]
pub enum TravelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Hotel search error: {0}")]
    HotelApi(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TravelError>;

impl TravelError {
    /// Errors caused by an upstream service (model or hotel search) rather than by us or the caller
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TravelError::Model(_)
                | TravelError::HotelApi(_)
                | TravelError::Http(_)
                | TravelError::Timeout(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            TravelError::Config(_) => "CONFIG_ERROR",
            TravelError::Model(_) => "MODEL_ERROR",
            TravelError::Http(_) => "HTTP_ERROR",
            TravelError::HotelApi(_) => "HOTEL_API_ERROR",
            TravelError::Serialization(_) => "SERIALIZATION_ERROR",
            TravelError::Storage(_) => "STORAGE_ERROR",
            TravelError::Validation(_) => "VALIDATION_ERROR",
            TravelError::NotFound(_) => "NOT_FOUND",
            TravelError::Unauthorized(_) => "UNAUTHORIZED",
            TravelError::Timeout(_) => "TIMEOUT_ERROR",
            TravelError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Message safe to hand back to an HTTP caller.
    ///
    /// Internal failures collapse to a generic sentence; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            TravelError::Validation(msg) | TravelError::NotFound(msg) => msg.clone(),
            TravelError::Unauthorized(_) => "Unauthorized".to_string(),
            TravelError::Model(_) | TravelError::Http(_) | TravelError::Timeout(_) => {
                "Failed to generate AI response".to_string()
            }
            TravelError::HotelApi(_) => "Failed to search hotels".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Convert to the `{ "message": ... }` body used for non-2xx responses
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.public_message(),
            "code": self.error_code(),
        })
    }
}
