pub mod ai;
pub mod config;
pub mod host;
pub mod materialize;
pub mod utils;

pub use ai::{AssistantError, ChatSession, GeminiClient, TextGenerator};
pub use config::AssistantConfig;
pub use host::{HostDocument, HostError, MemoryDocument};
pub use materialize::{HostKind, MaterializationPipeline, MaterializePlan, WriteOutcome};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info. Calling it
/// twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("office_assistant_lib=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
