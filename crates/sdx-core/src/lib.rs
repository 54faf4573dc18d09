pub mod config;
pub mod error;

pub use config::{PipelineConfig, StoreConfig, UpstreamConfig};
pub use error::{SdxError, SdxResult};
