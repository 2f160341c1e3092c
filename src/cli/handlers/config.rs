use crate::config::Settings;
use crate::error::Result;

/// Render the effective configuration as YAML or JSON
pub fn handle_config(settings: &Settings, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(settings)?)
    } else {
        settings.to_yaml()
    }
}
