//! Per-process UI state.
//!
//! RULE: `select_rule` is the only writer. Renderers take the selection as
//! an argument and never reach for this value themselves.

use crate::recommendations::RuleKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub selected_rule: Option<RuleKey>,
}

impl SessionState {
    /// Select a rule by its key. Unknown keys leave the state unchanged.
    /// Returns whether the selection was applied.
    pub fn select_rule(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<RuleKey>() {
            Ok(key) => {
                self.selected_rule = Some(key);
                log::debug!("selected recommendation {key}");
                true
            }
            Err(err) => {
                log::debug!("ignoring selection: {err}");
                false
            }
        }
    }
}
