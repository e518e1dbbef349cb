use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier, ParseError, Platform};

/// A key combination: a set of modifiers plus a single key.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyCombo {
    /// Set of modifier keys held down for this combination.
    pub modifiers: BTreeSet<Modifier>,
    /// The non-modifier key for this combination.
    pub key: Key,
}

impl KeyCombo {
    /// Construct a combination from parts.
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key,
        }
    }

    /// Parses a combination specification of the form "cmd+shift+s".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is always the key.
    /// - Modifiers accept the aliases handled by [`Modifier::from_spec`].
    /// - The key accepts the full [`Key::from_spec`] space.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
        let key_raw = parts.pop().unwrap_or_default();
        if key_raw.is_empty() {
            return Err(ParseError::MissingKey(s.to_string()));
        }
        let key = match Key::from_spec(key_raw) {
            Some(k) => k,
            None if Modifier::from_spec(key_raw).is_some() => {
                return Err(ParseError::MissingKey(s.to_string()));
            }
            None => return Err(ParseError::UnknownKey(key_raw.to_string())),
        };
        let modifiers = parse_modifier_list(&parts)?;
        Ok(Self { modifiers, key })
    }

    /// Canonical, platform-neutral string form (`super+shift+s`).
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<String> = self
            .modifiers
            .iter()
            .map(|m| m.to_spec().to_string())
            .collect();
        out.push(self.key.to_spec());
        out.join("+")
    }

    /// String form using the modifier names users expect on `platform`.
    pub fn to_platform_string(&self, platform: Platform) -> String {
        let mut out: Vec<String> = self
            .modifiers
            .iter()
            .map(|m| m.to_platform_spec(platform).to_string())
            .collect();
        out.push(self.key.to_spec());
        out.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

impl FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses a modifier-only prefix such as `"cmd+shift"`.
///
/// Used for bindings that supply their own final key (window movement expands
/// a prefix into one combination per arrow key).
pub fn parse_modifiers(s: &str) -> Result<BTreeSet<Modifier>, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
    parse_modifier_list(&parts)
}

/// Parse every element of `parts` as a modifier.
fn parse_modifier_list(parts: &[&str]) -> Result<BTreeSet<Modifier>, ParseError> {
    let mut modifiers = BTreeSet::new();
    for m in parts {
        if m.is_empty() {
            return Err(ParseError::EmptyComponent);
        }
        let mm = Modifier::from_spec(m).ok_or_else(|| ParseError::UnknownModifier(m.to_string()))?;
        modifiers.insert(mm);
    }
    Ok(modifiers)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_basic_combo() {
        let c = KeyCombo::parse("cmd+shift+s").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Super));
        assert!(c.modifiers.contains(&Modifier::Shift));
        assert_eq!(c.key, Key::S);
        assert_eq!(c.to_string(), "super+shift+s");
        assert_eq!(c.to_platform_string(Platform::MacOs), "cmd+shift+s");
    }

    #[test]
    fn default_bindings_parse() {
        for spec in [
            "cmd+shift+d",
            "ctrl+shift+d",
            "cmd+backslash",
            "ctrl+backslash",
            "cmd+shift+i",
            "cmd+shift+m",
            "ctrl+shift+a",
            "cmd+up",
            "ctrl+right",
        ] {
            assert!(KeyCombo::parse(spec).is_ok(), "{spec}");
        }
    }

    #[test]
    fn parse_errors() {
        assert_eq!(KeyCombo::parse("  "), Err(ParseError::Empty));
        assert!(matches!(
            KeyCombo::parse("cmd+shift"),
            Err(ParseError::MissingKey(_))
        ));
        assert!(matches!(
            KeyCombo::parse("cmd+"),
            Err(ParseError::MissingKey(_))
        ));
        assert!(matches!(
            KeyCombo::parse("hyper+k"),
            Err(ParseError::UnknownModifier(m)) if m == "hyper"
        ));
        assert!(matches!(
            KeyCombo::parse("cmd+banana"),
            Err(ParseError::UnknownKey(k)) if k == "banana"
        ));
        assert_eq!(KeyCombo::parse("cmd++k"), Err(ParseError::EmptyComponent));
    }

    #[test]
    fn modifier_prefix() {
        let mods = parse_modifiers("cmd").expect("prefix");
        assert_eq!(mods.into_iter().collect::<Vec<_>>(), vec![Modifier::Super]);
        assert!(parse_modifiers("cmd+k").is_err());
    }

    #[test]
    fn no_modifiers_letter() {
        let c = KeyCombo::parse("A").expect("parse");
        assert!(c.modifiers.is_empty());
        assert_eq!(c.to_string(), "a");
    }

    fn combo_strategy() -> impl Strategy<Value = KeyCombo> {
        (
            proptest::sample::subsequence(Modifier::ALL.to_vec(), 0..=4),
            proptest::sample::select(Key::ALL.to_vec()),
        )
            .prop_map(|(mods, key)| KeyCombo::new(mods, key))
    }

    proptest! {
        #[test]
        fn canonical_form_reparses(combo in combo_strategy()) {
            let spec = combo.to_string();
            prop_assert_eq!(KeyCombo::parse(&spec), Ok(combo.clone()));
            for p in Platform::ALL {
                prop_assert_eq!(KeyCombo::parse(&combo.to_platform_string(p)), Ok(combo.clone()));
            }
        }
    }
}
