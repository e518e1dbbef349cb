//! Overlay configuration.
//!
//! The configuration is a single RON file (default `~/.overlay/config.ron`)
//! holding the shortcut catalog, per-action binding overrides and the timing
//! knobs used by the dispatcher and the cross-surface signal watcher. Every
//! field is optional; an empty file yields [`Config::default`].
//!
//! ```ron
//! (
//!     capture_debounce_ms: 300,
//!     bindings: {
//!         "screenshot": (key: "cmd+shift+x"),
//!         "toggle_dashboard": (enabled: false),
//!     },
//! )
//! ```

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use keycombo::{KeyCombo, Platform, parse_modifiers};
use overlay_protocol::{ActionId, ShortcutBinding, ShortcutsConfig};
use serde::{Deserialize, Serialize};

mod catalog;
mod error;
mod loader;

pub use catalog::{PlatformKeys, ShortcutAction, default_actions};
pub use error::{Error, excerpt_at};
pub use loader::{load, load_from_path, load_from_str};

/// Default minimum spacing between accepted capture triggers.
pub const DEFAULT_CAPTURE_DEBOUNCE_MS: u64 = 300;
/// Default age after which a cross-surface signal is ignored.
pub const DEFAULT_SIGNAL_FRESHNESS_MS: u64 = 10_000;

/// Per-action override of the catalog default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingOverride {
    /// Replacement key combination; `None` keeps the platform default.
    pub key: Option<String>,
    /// Disabled actions are not bound.
    pub enabled: bool,
}

impl Default for BindingOverride {
    fn default() -> Self {
        Self {
            key: None,
            enabled: true,
        }
    }
}

/// Fully resolved user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Minimum spacing between accepted capture triggers, in milliseconds.
    pub capture_debounce_ms: u64,
    /// How long a published cross-surface signal stays relevant, in milliseconds.
    pub signal_freshness_ms: u64,
    /// Location of the signal store; defaults to `~/.overlay/signals.json`.
    pub signal_path: Option<PathBuf>,
    /// Action catalog. Replaces the built-in catalog when present.
    pub actions: Vec<ShortcutAction>,
    /// Per-action overrides keyed by action identifier.
    pub bindings: BTreeMap<ActionId, BindingOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_debounce_ms: DEFAULT_CAPTURE_DEBOUNCE_MS,
            signal_freshness_ms: DEFAULT_SIGNAL_FRESHNESS_MS,
            signal_path: None,
            actions: default_actions(),
            bindings: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Capture debounce interval.
    pub fn capture_debounce(&self) -> Duration {
        Duration::from_millis(self.capture_debounce_ms)
    }

    /// Signal freshness window.
    pub fn signal_freshness(&self) -> Duration {
        Duration::from_millis(self.signal_freshness_ms)
    }

    /// Effective signal store path.
    pub fn signal_path(&self) -> PathBuf {
        self.signal_path
            .clone()
            .unwrap_or_else(|| overlay_dir().join("signals.json"))
    }

    /// Look up a catalog action.
    pub fn action(&self, id: &str) -> Option<&ShortcutAction> {
        self.actions.iter().find(|a| a.id.as_str() == id)
    }

    /// The binding table for `platform`, with overrides applied.
    pub fn shortcuts_config(&self, platform: Platform) -> ShortcutsConfig {
        ShortcutsConfig::from_bindings(self.actions.iter().map(|a| {
            let ov = self.bindings.get(&a.id);
            let key = ov
                .and_then(|o| o.key.clone())
                .unwrap_or_else(|| a.default_key.for_platform(platform).to_string());
            ShortcutBinding {
                action: a.id.clone(),
                key,
                enabled: ov.is_none_or(|o| o.enabled),
            }
        }))
    }

    /// Check catalog and overrides for consistency.
    pub fn validate(&self) -> Result<(), Error> {
        self.check()
            .map_err(|p| Error::validation(p.message, None, None, None))
    }

    /// First consistency problem, if any.
    fn check(&self) -> Result<(), Problem> {
        let mut seen = HashSet::new();
        for a in &self.actions {
            if a.id.as_str().trim().is_empty() {
                return Err(Problem::new("action id must not be empty", None));
            }
            if !seen.insert(a.id.as_str()) {
                return Err(Problem::new(
                    format!("duplicate action '{}'", a.id),
                    Some(a.id.as_str()),
                ));
            }
            for (platform, key) in a.default_key.iter() {
                check_key(a, key).map_err(|e| {
                    Problem::new(
                        format!("action '{}' has invalid {platform} key '{key}': {e}", a.id),
                        Some(key),
                    )
                })?;
            }
        }
        for (id, ov) in &self.bindings {
            let Some(action) = self.action(id.as_str()) else {
                return Err(Problem::new(
                    format!("binding override for unknown action '{id}'"),
                    Some(id.as_str()),
                ));
            };
            if let Some(key) = &ov.key {
                check_key(action, key).map_err(|e| {
                    Problem::new(
                        format!("binding for '{id}' has invalid key '{key}': {e}"),
                        Some(key),
                    )
                })?;
            }
        }
        for platform in Platform::ALL {
            self.check_conflicts(platform)?;
        }
        Ok(())
    }

    /// Two enabled actions must not resolve to the same combination.
    fn check_conflicts(&self, platform: Platform) -> Result<(), Problem> {
        let table = self.shortcuts_config(platform);
        let mut owners: HashMap<KeyCombo, &ActionId> = HashMap::new();
        for b in table.active() {
            let Ok(combo) = KeyCombo::parse(&b.key) else {
                continue;
            };
            if let Some(prev) = owners.insert(combo, &b.action) {
                return Err(Problem::new(
                    format!(
                        "'{}' and '{}' share the {platform} key '{}'",
                        prev, b.action, b.key
                    ),
                    Some(&b.key),
                ));
            }
        }
        Ok(())
    }
}

/// A validation failure plus text that locates it in the source file.
struct Problem {
    /// Human-readable message.
    message: String,
    /// Text to search for when locating the problem.
    needle: Option<String>,
}

impl Problem {
    /// Build a problem.
    fn new(message: impl Into<String>, needle: Option<&str>) -> Self {
        Self {
            message: message.into(),
            needle: needle.map(|n| format!("\"{n}\"")),
        }
    }
}

/// Validate a configured key for `action`. Empty keys mean "unbound".
fn check_key(action: &ShortcutAction, key: &str) -> Result<(), keycombo::ParseError> {
    if key.trim().is_empty() {
        return Ok(());
    }
    if action.takes_modifier_prefix() {
        parse_modifiers(key).map(|_| ())
    } else {
        KeyCombo::parse(key).map(|_| ())
    }
}

/// `~/.overlay`.
fn overlay_dir() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".overlay");
    p
}

/// Default configuration file location: `~/.overlay/config.ron`.
pub fn default_config_path() -> PathBuf {
    overlay_dir().join("config.ron")
}

/// Resolve the effective config path.
///
/// Policy:
/// 1) Use `explicit` when provided (it must exist).
/// 2) Else use `~/.overlay/config.ron` when it exists.
/// 3) Else `None`: built-in defaults apply.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, Error> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Read {
                path: Some(path.to_path_buf()),
                message: "Config file not found".to_string(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }
    let preferred = default_config_path();
    Ok(preferred.exists().then_some(preferred))
}

#[cfg(test)]
mod tests {
    use overlay_protocol::actions;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.capture_debounce(), Duration::from_millis(300));
        assert_eq!(cfg.signal_freshness(), Duration::from_secs(10));
        assert!(cfg.signal_path().ends_with(".overlay/signals.json"));
    }

    #[test]
    fn shortcuts_follow_platform() {
        let cfg = Config::default();
        let mac = cfg.shortcuts_config(Platform::MacOs);
        let win = cfg.shortcuts_config(Platform::Windows);
        assert_eq!(mac.len(), actions::BUILTIN.len());
        assert_eq!(mac.bindings[actions::SCREENSHOT].key, "cmd+shift+s");
        assert_eq!(win.bindings[actions::SCREENSHOT].key, "ctrl+shift+s");
        assert_eq!(mac.bindings[actions::MOVE_WINDOW].key, "cmd");
        assert_eq!(win.bindings[actions::TOGGLE_WINDOW].key, "ctrl+backslash");
    }

    #[test]
    fn overrides_apply() {
        let mut cfg = Config::default();
        cfg.bindings.insert(
            ActionId::from(actions::SCREENSHOT),
            BindingOverride {
                key: Some("alt+p".into()),
                enabled: true,
            },
        );
        cfg.bindings.insert(
            ActionId::from(actions::TOGGLE_DASHBOARD),
            BindingOverride {
                key: None,
                enabled: false,
            },
        );
        cfg.validate().expect("valid");
        let table = cfg.shortcuts_config(Platform::Linux);
        assert_eq!(table.bindings[actions::SCREENSHOT].key, "alt+p");
        let dash = &table.bindings[actions::TOGGLE_DASHBOARD];
        assert_eq!(dash.key, "ctrl+shift+d");
        assert!(!dash.enabled);
        assert_eq!(table.active().count(), actions::BUILTIN.len() - 1);
    }

    #[test]
    fn rejects_bad_keys_and_unknown_overrides() {
        let mut cfg = Config::default();
        cfg.bindings.insert(
            ActionId::from(actions::SCREENSHOT),
            BindingOverride {
                key: Some("cmd+shift".into()),
                enabled: true,
            },
        );
        let err = cfg.validate().expect_err("missing key");
        assert!(err.to_string().contains("invalid key 'cmd+shift'"));

        let mut cfg = Config::default();
        cfg.bindings
            .insert(ActionId::from("ghost"), BindingOverride::default());
        assert!(
            cfg.validate()
                .expect_err("unknown")
                .to_string()
                .contains("unknown action 'ghost'")
        );
    }

    #[test]
    fn move_window_takes_prefix_only() {
        let mut cfg = Config::default();
        cfg.bindings.insert(
            ActionId::from(actions::MOVE_WINDOW),
            BindingOverride {
                key: Some("ctrl+alt".into()),
                enabled: true,
            },
        );
        cfg.validate().expect("prefix ok");
        cfg.bindings.insert(
            ActionId::from(actions::MOVE_WINDOW),
            BindingOverride {
                key: Some("ctrl+k".into()),
                enabled: true,
            },
        );
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_conflicting_bindings() {
        let mut cfg = Config::default();
        cfg.bindings.insert(
            ActionId::from(actions::SCREENSHOT),
            BindingOverride {
                key: Some("ctrl+shift+a".into()),
                enabled: true,
            },
        );
        let err = cfg.validate().expect_err("conflict");
        assert!(err.to_string().contains("share the"), "{err}");

        // Disabling one side resolves the conflict.
        cfg.bindings.insert(
            ActionId::from(actions::AUDIO_RECORDING),
            BindingOverride {
                key: None,
                enabled: false,
            },
        );
        cfg.validate().expect("no conflict");
    }

    #[test]
    fn duplicate_actions_rejected() {
        let mut cfg = Config::default();
        cfg.actions.push(cfg.actions[0].clone());
        assert!(cfg.validate().is_err());
    }
}
