//! Functions for loading preloader settings.

use std::io::Read;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::*;

/// When the aggregate completion condition gets evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Evaluates after every single completion, and once after each dispatch pass.
    Recheck,
    /// Evaluates only once right after each dispatch pass. Completions arriving later
    /// are recorded but never fire the callback.
    SingleCheck,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::Recheck
    }
}

/// A structure containing configuration data for the preloader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadParams {
    /// The number of worker threads fetching items. Fetches run inline on the thread
    /// calling `load` if zero.
    pub workers: u32,
    /// The stack size of worker threads.
    pub stack_size: Option<usize>,
    pub policy: CompletionPolicy,
    /// Fires the callback of a `load` immediately if nothing has been queued.
    pub fire_on_empty: bool,
    /// Relative paths of the `file` schema are resolved against this directory.
    pub root: Option<PathBuf>,
}

impl Default for PreloadParams {
    fn default() -> Self {
        PreloadParams {
            workers: 2,
            stack_size: None,
            policy: CompletionPolicy::Recheck,
            fire_on_empty: false,
            root: None,
        }
    }
}

impl PreloadParams {
    /// Parameters of a preloader without worker threads.
    pub fn headless() -> Self {
        PreloadParams {
            workers: 0,
            ..Default::default()
        }
    }

    /// Reads parameters from JSON, missing fields take their defaults.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json() {
        let params = PreloadParams::from_json(&b"{}"[..]).unwrap();
        assert_eq!(params, PreloadParams::default());

        let src = r#"{ "workers": 0, "policy": "single_check", "fire_on_empty": true }"#;
        let params = PreloadParams::from_json(src.as_bytes()).unwrap();
        assert_eq!(params.workers, 0);
        assert_eq!(params.policy, CompletionPolicy::SingleCheck);
        assert!(params.fire_on_empty);
        assert_eq!(params.root, None);

        assert!(PreloadParams::from_json(&br#"{ "policy": "never" }"#[..]).is_err());
    }
}
