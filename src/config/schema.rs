use serde::{Deserialize, Serialize};

use crate::grading::GradingConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub grading: Option<GradingConfig>,
}

impl Config {
    /// Grading rules in effect: the configured section, or the defaults.
    pub fn effective_grading(&self) -> GradingConfig {
        self.grading.clone().unwrap_or_default()
    }
}
