use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub master: bool,
    #[serde(default)]
    pub masters: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    Active,
    Inactive,
}

impl PluginState {
    pub fn is_active(self) -> bool {
        matches!(self, PluginState::Active)
    }
}
