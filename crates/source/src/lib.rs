pub mod config;
pub mod error;
pub mod feed;
pub mod fixture;
pub mod source;

pub use config::SourceConfig;
pub use error::SourceError;
pub use feed::{HttpFeed, RecordFeed};
pub use fixture::{FixtureGenerator, FixtureSettings};
pub use source::RecordSource;
