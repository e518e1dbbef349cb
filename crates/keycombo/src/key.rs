use serde::{Deserialize, Serialize};

/// Declares the `Key` enum together with its canonical lowercase spec names.
macro_rules! keys {
    ( $( $variant:ident => $name:expr, )* ) => {
        /// Non-modifier keys that can terminate a key combination.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[allow(missing_docs)]
        pub enum Key {
            $( $variant, )*
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )* ];

            /// Canonical lowercase spec name for this key.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Look up a key by its canonical name, case-insensitively.
            pub fn from_name(s: &str) -> Option<Self> {
                let lowered = s.to_ascii_lowercase();
                match lowered.as_str() {
                    $( $name => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

keys! {
    A => "a",
    B => "b",
    C => "c",
    D => "d",
    E => "e",
    F => "f",
    G => "g",
    H => "h",
    I => "i",
    J => "j",
    K => "k",
    L => "l",
    M => "m",
    N => "n",
    O => "o",
    P => "p",
    Q => "q",
    R => "r",
    S => "s",
    T => "t",
    U => "u",
    V => "v",
    W => "w",
    X => "x",
    Y => "y",
    Z => "z",
    Digit0 => "digit0",
    Digit1 => "digit1",
    Digit2 => "digit2",
    Digit3 => "digit3",
    Digit4 => "digit4",
    Digit5 => "digit5",
    Digit6 => "digit6",
    Digit7 => "digit7",
    Digit8 => "digit8",
    Digit9 => "digit9",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    F13 => "f13",
    F14 => "f14",
    F15 => "f15",
    F16 => "f16",
    F17 => "f17",
    F18 => "f18",
    F19 => "f19",
    F20 => "f20",
    F21 => "f21",
    F22 => "f22",
    F23 => "f23",
    F24 => "f24",
    Up => "up",
    Down => "down",
    Left => "left",
    Right => "right",
    Home => "home",
    End => "end",
    PageUp => "pageup",
    PageDown => "pagedown",
    Insert => "insert",
    Delete => "delete",
    Backspace => "backspace",
    Enter => "enter",
    Tab => "tab",
    Escape => "escape",
    Space => "space",
    Minus => "minus",
    Equal => "equal",
    BracketLeft => "bracketleft",
    BracketRight => "bracketright",
    Backslash => "backslash",
    Semicolon => "semicolon",
    Quote => "quote",
    Comma => "comma",
    Period => "period",
    Slash => "slash",
    Backquote => "backquote",
    PrintScreen => "printscreen",
}

impl Key {
    /// True for the four arrow keys.
    pub fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}
