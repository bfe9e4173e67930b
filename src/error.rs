use thiserror::Error;

/// Everything that can stop a scenario before its expectations are judged.
///
/// Assertion mismatches are not errors: they are recorded as failed
/// `AssertionResult`s so every expected/actual pair is reported.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Node.js driver process failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the driver process failed
    #[error("Browser session I/O error: {0}")]
    SessionIo(String),

    /// Driver answered with ok=false for a non-timeout reason
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Element did not become actionable within the bounded wait
    #[error("Timed out after {timeout_ms}ms locating '{selector}'")]
    LocateTimeout { selector: String, timeout_ms: u64 },

    /// Page load did not finish within the bounded wait
    #[error("Timed out after {timeout_ms}ms loading {url}")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// Driver process sent nothing back in time and was killed
    #[error("Driver gave no {context} within {timeout_ms}ms")]
    DriverUnresponsive { context: String, timeout_ms: u64 },

    /// A scenario needs an environment-supplied credential that is unset
    #[error("Missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    /// A scenario asks for a step the login flow cannot take from its state
    #[error("Illegal step '{action}' from state {from}")]
    IllegalTransition { from: String, action: String },

    #[error("Invalid URL pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
