pub mod cancel;
pub mod pipeline_config;
pub mod stream;

mod stage;

pub use cancel::CancelHandle;
pub use pipeline_config::PipelineConfig;
pub use stream::FeedStream;
