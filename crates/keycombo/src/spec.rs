use crate::Key;

// Central mapping between keys and single-character shorthand specs.
// Extend this list to cover more punctuation or shorthand.
macro_rules! key_spec_map {
    ($m:ident, $arg:tt) => {
        $m! { $arg,
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            Minus => "-",
            Equal => "=",
            BracketLeft => "[",
            BracketRight => "]",
            Backslash => "\\",
            Semicolon => ";",
            Quote => "'",
            Comma => ",",
            Period => ".",
            Slash => "/",
            Backquote => "`",
        }
    };
}

/// Emit the shorthand for a key, falling back to its canonical name.
macro_rules! to_spec_match {
    ( $key:expr, $( $k:ident => $s:expr, )* ) => {
        match $key {
            $( Key::$k => $s, )*
            _ => $key.name(),
        }
    }
}

/// Map a spec string onto a key through a table.
macro_rules! from_spec_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        match $s {
            $( $v => Some(Key::$k), )*
            _ => None,
        }
    }}
}

// Aliases that only apply to parsing specs (not emitted by to_spec).
macro_rules! key_spec_aliases {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            Enter => "return",
            Enter => "ret",
            Escape => "esc",
            Delete => "del",
            Backspace => "back",
            PageUp => "pgup",
            PageDown => "pgdn",
            Up => "arrowup",
            Down => "arrowdown",
            Left => "arrowleft",
            Right => "arrowright",
            BracketLeft => "leftbracket",
            BracketRight => "rightbracket",
            Backquote => "grave",
            PrintScreen => "prtsc",
        }
    };
}

/// Parses a key specification into a `Key`.
///
/// Tries the canonical name first, then single-character shorthand, then
/// alias words (case-insensitive).
pub fn from_spec(s: &str) -> Option<Key> {
    if let Some(k) = Key::from_name(s) {
        return Some(k);
    }
    if let some @ Some(_) = key_spec_map!(from_spec_match, s) {
        return some;
    }
    let lowered = s.to_ascii_lowercase();
    key_spec_aliases!(from_spec_match, lowered.as_str())
}

/// Returns the key specification string for a `Key`.
///
/// Named keys (letters, arrows, function keys, and spelled-out punctuation)
/// keep their name; digits use their symbol so `cmd+1` renders as written.
pub fn to_spec(key: Key) -> String {
    match key {
        Key::Digit0
        | Key::Digit1
        | Key::Digit2
        | Key::Digit3
        | Key::Digit4
        | Key::Digit5
        | Key::Digit6
        | Key::Digit7
        | Key::Digit8
        | Key::Digit9 => key_spec_map!(to_spec_match, key).to_string(),
        _ => key.name().to_string(),
    }
}

impl Key {
    /// Parses a key specification string into a `Key`.
    ///
    /// Accepts canonical names in any case, digit and punctuation symbols
    /// (`1`, `\\`, `,` ...), and alias words such as `esc`, `return`, `pgup`.
    pub fn from_spec(s: &str) -> Option<Self> {
        from_spec(s)
    }

    /// Returns the key specification string for this `Key`.
    pub fn to_spec(self) -> String {
        to_spec(self)
    }
}
