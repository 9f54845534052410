//! Step scripts that drive a sandbox and a guest against a JSON target.

use serde::{Deserialize, Serialize};
use shadowbox_core::{CoreError, Value};
use shadowbox_sandbox::snapshot::target_object;
use shadowbox_sandbox::{Sandbox, SandboxConfig, SandboxError, SandboxState};
use std::path::Path;

/// Script errors
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid JSON for its role
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Sandbox rejected a transition or guest write
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// Target could not be rendered
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// One script step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Activate the sandbox
    Activate,
    /// Deactivate the sandbox
    Deactivate,
    /// Guest assigns a property
    Set {
        /// Property key
        key: String,
        /// New value
        value: serde_json::Value,
    },
    /// Guest removes a property
    Delete {
        /// Property key
        key: String,
    },
    /// Record the target without changing anything
    Print,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Set { .. } => "set",
            Self::Delete { .. } => "delete",
            Self::Print => "print",
        }
    }
}

/// Ordered list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a JSON array of steps
    ///
    /// # Errors
    ///
    /// Returns `Parse` if the text is not a step array
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a step array from a file
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Parse` on failure
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        Self::from_json(&read_text(path)?)
    }

    /// The window walkthrough: a guest renames two properties and adds one,
    /// is suspended, then resumed.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            steps: vec![
                Step::Activate,
                Step::Set {
                    key: "name".to_string(),
                    value: serde_json::json!("guest window"),
                },
                Step::Set {
                    key: "desc".to_string(),
                    value: serde_json::json!("guest description"),
                },
                Step::Set {
                    key: "newData".to_string(),
                    value: serde_json::json!({"age": 13}),
                },
                Step::Print,
                Step::Deactivate,
                Step::Activate,
            ],
        }
    }
}

/// Host target used by [`Script::demo`]
#[must_use]
pub fn demo_target() -> serde_json::Value {
    serde_json::json!({
        "name": "host window",
        "desc": "host description",
        "data": {"age": 12}
    })
}

/// Read a JSON file
///
/// # Errors
///
/// Returns `Io` or `Parse` on failure
pub fn read_json(path: &Path) -> Result<serde_json::Value, ScriptError> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}

fn read_text(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Target and sandbox state after a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// Step number, from 1
    pub step: usize,
    /// Step name
    pub op: &'static str,
    /// Sandbox state after the step
    pub state: SandboxState,
    /// Target after the step
    pub target: serde_json::Value,
}

/// Runs scripts against one target and one sandbox
#[derive(Debug)]
pub struct ScriptRunner {
    sandbox: Sandbox,
}

impl ScriptRunner {
    /// Create a runner over a target built from JSON
    #[must_use]
    pub fn new(target: &serde_json::Value, config: SandboxConfig) -> Self {
        Self {
            sandbox: Sandbox::new(Value::from_json(target)).with_config(config),
        }
    }

    /// The sandbox under test
    #[must_use]
    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Run every step, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first sandbox or guest write failure
    pub fn run(&mut self, script: &Script) -> Result<Vec<TranscriptEntry>, ScriptError> {
        let mut transcript = Vec::with_capacity(script.steps.len());
        for (i, step) in script.steps.iter().enumerate() {
            tracing::debug!(step = i + 1, op = step.name(), "running step");
            self.apply(step)?;
            transcript.push(TranscriptEntry {
                step: i + 1,
                op: step.name(),
                state: self.sandbox.state(),
                target: self.sandbox.target().to_json()?,
            });
        }
        Ok(transcript)
    }

    fn apply(&mut self, step: &Step) -> Result<(), ScriptError> {
        match step {
            Step::Activate => {
                self.sandbox.activate()?;
            }
            Step::Deactivate => {
                self.sandbox.deactivate()?;
            }
            Step::Set { key, value } => {
                target_object(self.sandbox.target())?
                    .set(key, Value::from_json(value))
                    .map_err(SandboxError::from)?;
            }
            Step::Delete { key } => {
                target_object(self.sandbox.target())?
                    .delete(key)
                    .map_err(SandboxError::from)?;
            }
            Step::Print => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_script() {
        let script = Script::from_json(
            r#"[{"op":"activate"},{"op":"set","key":"a","value":1},{"op":"delete","key":"b"},{"op":"deactivate"},{"op":"print"}]"#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 5);
        assert_eq!(
            script.steps[1],
            Step::Set {
                key: "a".to_string(),
                value: json!(1)
            }
        );
    }

    #[test]
    fn test_parse_script_unknown_op() {
        let err = Script::from_json(r#"[{"op":"explode"}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn test_demo_transcript() {
        let mut runner = ScriptRunner::new(&demo_target(), SandboxConfig::default());
        let transcript = runner.run(&Script::demo()).unwrap();
        assert_eq!(transcript.len(), 7);

        let guest = json!({
            "name": "guest window",
            "desc": "guest description",
            "data": {"age": 12},
            "newData": {"age": 13}
        });
        assert_eq!(transcript[4].target, guest);
        assert_eq!(transcript[5].op, "deactivate");
        assert_eq!(transcript[5].state, SandboxState::Inactive);
        assert_eq!(transcript[5].target, demo_target());
        assert_eq!(transcript[6].state, SandboxState::Active);
        assert_eq!(transcript[6].target, guest);
    }

    #[test]
    fn test_null_target_fails() {
        let mut runner = ScriptRunner::new(&json!(null), SandboxConfig::default());
        let script = Script {
            steps: vec![Step::Activate],
        };
        let err = runner.run(&script).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Sandbox(SandboxError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_read_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1}}"#).unwrap();
        assert_eq!(read_json(file.path()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_load_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"op":"activate"}},{{"op":"print"}}]"#).unwrap();
        let script = Script::load(file.path()).unwrap();
        assert_eq!(script.steps, vec![Step::Activate, Step::Print]);
    }

    #[test]
    fn test_read_json_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }
}
