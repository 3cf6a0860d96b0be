use crate::commands::{CmdMessage, CmdResult};
use crate::config::{CafeConfig, CONFIG_FILENAME};
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Path,
}

/// Reports the configuration as loaded from `dir` (plus env). `config` is
/// the effective config after any command-line overrides.
pub fn run(dir: Option<&Path>, config: &CafeConfig, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default().with_config(config.clone())),
        ConfigAction::ShowKey(key) => {
            let mut result = CmdResult::default();
            match config.entries().into_iter().find(|(k, _)| *k == key) {
                Some((_, value)) => result.add_message(CmdMessage::info(value)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Path => {
            let mut result = CmdResult::default();
            match dir {
                Some(dir) => {
                    let path = dir.join(CONFIG_FILENAME);
                    if !path.exists() {
                        result.add_message(CmdMessage::info(
                            "No config file yet; compiled defaults are in use",
                        ));
                    }
                    result.config_path = Some(path);
                }
                None => result.add_message(CmdMessage::warning(
                    "Could not determine a config directory",
                )),
            }
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn show_all_returns_config() {
        let config = CafeConfig::default();
        let result = run(None, &config, ConfigAction::ShowAll).unwrap();
        assert_eq!(result.config, Some(config));
    }

    #[test]
    fn show_key_known_and_unknown() {
        let config = CafeConfig::default();
        let result = run(
            None,
            &config,
            ConfigAction::ShowKey("filters.price_range".to_string()),
        )
        .unwrap();
        assert_eq!(result.messages[0].content, "3");

        let result = run(None, &config, ConfigAction::ShowKey("nope".to_string())).unwrap();
        assert!(result.has_level(MessageLevel::Error));
    }

    #[test]
    fn path_points_at_toml_file() {
        let temp = tempdir().unwrap();
        let config = CafeConfig::default();
        let result = run(Some(temp.path()), &config, ConfigAction::Path).unwrap();
        assert_eq!(result.config_path, Some(temp.path().join(CONFIG_FILENAME)));
        assert!(result.has_level(MessageLevel::Info));

        fs::write(temp.path().join(CONFIG_FILENAME), "").unwrap();
        let result = run(Some(temp.path()), &config, ConfigAction::Path).unwrap();
        assert!(result.messages.is_empty());
    }
}
