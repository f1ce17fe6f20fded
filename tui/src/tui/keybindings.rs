use super::{
    Action,
    Screen,
};
use crossterm::event::{
    KeyCode,
    KeyEvent,
    KeyModifiers,
};
use derive_more::{
    Deref,
    DerefMut,
};
use eyre::{
    bail,
    eyre,
    Context as _,
    Result,
};
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_KEYBINDINGS: &str = include_str!("default-keybindings.yaml");

/// Key sequences and the action they trigger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct Keymap(pub HashMap<Vec<KeyEvent>, Action>);

/// Global keys apply on every screen, screen keys only while that screen is active.
#[derive(Clone, Debug, Default)]
pub struct KeyBindings {
    global: Keymap,
    screens: HashMap<Screen, Keymap>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawKeyBindings {
    global: HashMap<String, Action>,
    #[serde(default)]
    rankings: HashMap<String, Action>,
    #[serde(default)]
    charts: HashMap<String, Action>,
    #[serde(default)]
    logs: HashMap<String, Action>,
}

impl KeyBindings {
    pub fn from_yaml(source: &str) -> Result<Self> {
        let raw: RawKeyBindings =
            serde_yml::with::singleton_map_recursive::deserialize(serde_yml::Deserializer::from_str(source))
                .context("Failed to read keybindings")?;
        Ok(Self {
            global: Keymap::parse(raw.global)?,
            screens: [
                (Screen::Rankings, raw.rankings),
                (Screen::Charts, raw.charts),
                (Screen::Logs, raw.logs),
            ]
            .into_iter()
            .map(|(screen, keys)| Ok((screen, Keymap::parse(keys)?)))
            .collect::<Result<_>>()?,
        })
    }

    pub fn load_default() -> Result<Self> {
        Self::from_yaml(DEFAULT_KEYBINDINGS)
    }

    /// Screen keys win over global ones.
    pub fn lookup(&self, screen: Screen, keys: &[KeyEvent]) -> Option<&Action> {
        self.screens
            .get(&screen)
            .and_then(|keymap| keymap.get(keys))
            .or_else(|| self.global.get(keys))
    }
}

impl Keymap {
    fn parse(raw: HashMap<String, Action>) -> Result<Self> {
        raw.into_iter()
            .map(|(keys, action)| Ok((parse_key_sequence(&keys)?, action)))
            .collect::<Result<_>>()
            .map(Self)
    }
}

/// Parses `<ctrl-c>` or `<g><g>` style sequences.
pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>> {
    let Some(inner) = raw.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) else {
        bail!("Key sequence must be wrapped in <>: {raw}");
    };
    inner.split("><").map(parse_key_event).collect()
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent> {
    let mut modifiers = KeyModifiers::empty();
    let mut rest = raw;
    loop {
        let lower = rest.to_ascii_lowercase();
        let stripped = ["ctrl-", "alt-", "shift-"]
            .into_iter()
            .find(|prefix| lower.starts_with(prefix) && rest.len() > prefix.len());
        match stripped {
            Some("ctrl-") => modifiers.insert(KeyModifiers::CONTROL),
            Some("alt-") => modifiers.insert(KeyModifiers::ALT),
            Some("shift-") => modifiers.insert(KeyModifiers::SHIFT),
            _ => break,
        }
        rest = &rest[stripped.map_or(0, str::len)..];
    }

    let code = match rest.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(eyre!("Unknown key: {raw}")),
            }
        }
    };

    if let KeyCode::Char(c) = code {
        if c.is_ascii_uppercase() {
            modifiers.insert(KeyModifiers::SHIFT);
        }
    }
    Ok(KeyEvent::new(code, modifiers))
}
