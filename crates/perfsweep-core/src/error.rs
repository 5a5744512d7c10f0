use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required collaborator (the measured program) is missing at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The harness or the measured program exited unsuccessfully.
    #[error("`{command}` failed with {status}: {stderr}", status = exit_code_label(.code))]
    SubprocessFailure {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A harness record could not be decoded.
    #[error("Failed to parse harness record `{line}`: {reason}")]
    Parse { line: String, reason: String },

    /// A workload or grid value that cannot be measured or persisted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A cache entry exists under the key but describes another workload.
    #[error("Cache entry `{key}` does not match the requested workload")]
    CacheMismatch { key: String },

    #[error("{0}")]
    Other(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_failure_message() {
        let err = Error::SubprocessFailure {
            command: "perf stat".to_string(),
            code: Some(3),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "`perf stat` failed with exit code 3: boom");

        let err = Error::SubprocessFailure {
            command: "perf stat".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
