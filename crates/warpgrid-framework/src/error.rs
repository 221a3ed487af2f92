//! Framework error types.

use thiserror::Error;

use crate::registry::BoxError;
use crate::status::Status;

/// Errors raised by the framework while building or running a profile.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("plugin already registered: {0}")]
    AlreadyRegistered(String),

    #[error("plugin not registered: {0}")]
    NotRegistered(String),

    #[error("plugin {name} listed more than once in profile")]
    DuplicatePlugin { name: String },

    #[error("invalid score weight {weight} for plugin {name}, must be at least 1")]
    InvalidWeight { name: String, weight: i64 },

    #[error("failed to initialize plugin {name}: {source}")]
    PluginInit {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("node not found in snapshot: {0}")]
    NodeNotFound(String),

    #[error("error reading {0} from cycle state")]
    StateNotFound(String),

    #[error("pre-filter plugin {plugin} rejected pod: {status}")]
    PreFilter { plugin: String, status: Status },

    #[error("pre-score plugin {plugin} failed: {status}")]
    PreScore { plugin: String, status: Status },

    #[error("score plugin {plugin} failed: {status}")]
    Score { plugin: String, status: Status },

    #[error("profile parse error: {0}")]
    Profile(#[from] toml::de::Error),

    #[error("profile serialize error: {0}")]
    ProfileSerialize(#[from] toml::ser::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;
