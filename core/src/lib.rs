// Dasturxon Core Library
// Restaurant order analytics client: remote statistics, live push channel, page state

pub mod api;
pub mod config;
pub mod derive;
pub mod fallback;
pub mod fetch;
pub mod live;
pub mod model;
pub mod pages;
pub mod prefs;
pub mod store;
pub mod telemetry;

// Export core types
pub use api::{ApiClient, StatsSource, EXPORT_FILE_NAME};
pub use config::ClientConfig;
pub use derive::{derive_foods, FoodQuery, SortField, SortOrder, SortSpec};
pub use fetch::{join_settled, join_with_fallback, with_fallback, Fetched, Origin};
pub use live::{ChannelState, EventTransport, LiveChannel, SseTransport, Subscription};
pub use model::{
    CategoryStat, CustomerAnalysis, FoodStat, HeatmapMatrix, OrderFilters, OrderRecord,
    OverviewStats, Period, PushEvent, TimeTrendPoint, TopCustomer,
};
pub use pages::{AnalysisPage, DashboardPage, FoodsPage, PageContext};
pub use prefs::{Language, PreferenceStore, Preferences, Theme};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    /// A read or write call against the statistics API failed
    #[error("Remote failure on {resource}: {cause}")]
    RemoteFailure { resource: String, cause: String },

    #[error("Export failure: {0}")]
    ExportFailure(String),

    /// Connection-level failure on the push channel
    #[error("Stream failure: {0}")]
    StreamFailure(String),

    /// A push message that could not be decoded
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Page error: {0}")]
    PageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DashError {
    pub fn remote(resource: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        DashError::RemoteFailure {
            resource: resource.into(),
            cause: cause.to_string(),
        }
    }

    /// Short machine-readable code, used in log fields
    pub fn code(&self) -> &'static str {
        match self {
            DashError::RemoteFailure { .. } => "REMOTE_FAILURE",
            DashError::ExportFailure(_) => "EXPORT_FAILURE",
            DashError::StreamFailure(_) => "STREAM_FAILURE",
            DashError::DecodeFailure(_) => "DECODE_FAILURE",
            DashError::ConfigError(_) => "CONFIG_ERROR",
            DashError::PageError(_) => "PAGE_ERROR",
            DashError::IoError(_) => "IO_ERROR",
            DashError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
