use serde::{Serialize, Deserialize};

/// Configuration for a streaming `feed_stream` run.
///
/// # Fields
/// - `capacity`           — slots in each inter-stage queue. A full queue
///                          blocks the stage feeding it (back-pressure).
///                          `0` makes every hand-off a rendezvous.
/// - `thread_name_prefix` — worker threads are named `{prefix}-{stage}` and
///                          `{prefix}-input` for the producer.
///
/// Missing fields fall back to their defaults when deserialized, so the
/// struct can be embedded in a host application's own config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub capacity: usize,
    pub thread_name_prefix: String,
}

impl PipelineConfig {
    pub const DEFAULT_CAPACITY: usize = 4;

    pub fn new(capacity: usize) -> Self {
        PipelineConfig {
            capacity,
            ..PipelineConfig::default()
        }
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            capacity: PipelineConfig::DEFAULT_CAPACITY,
            thread_name_prefix: "conduit-stage".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_default_prefix() {
        let config = PipelineConfig::new(1);
        assert_eq!(config.capacity, 1);
        assert_eq!(config.thread_name_prefix, "conduit-stage");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "capacity": 16 }"#).unwrap();
        assert_eq!(config, PipelineConfig::new(16));

        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
