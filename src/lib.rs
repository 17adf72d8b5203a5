pub mod adjuster;
pub mod candidate;
pub mod config;
pub mod error;
pub mod format;
pub mod grouping;
pub mod history;
pub mod io;
pub mod participant;
pub mod penalty;
pub mod pipeline;
pub mod scoring;
pub mod selector;

pub use error::*;
pub use grouping::Matching;
pub use history::HistoryMatrix;
pub use participant::{Id, Participant, ParticipantTable};
pub use pipeline::{create_matching, create_matching_with_params, select_matching, MatchingOutcome};

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber honouring `RUST_LOG` (default `info`).
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    tracing::debug!("[{}] tracing initialised", service_name);
}
