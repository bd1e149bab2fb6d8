pub mod config;
pub mod pools;
pub mod routes;
pub mod transfers;

pub use config::*;
pub use pools::*;
pub use routes::*;
pub use transfers::*;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;

/// Current Unix time in seconds.
pub fn now_seconds() -> Timestamp {
	chrono::Utc::now().timestamp() as Timestamp
}
