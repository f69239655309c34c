#![forbid(unsafe_code)]

//! Keyboard combination binding.
//!
//! Combination specs are parsed once at bind time, never per keystroke.
//! A spec is a space-separated list of variations; each variation is a
//! dash-separated set of tokens where `alt`/`meta`, `ctrl`, and `shift`
//! name modifiers and exactly one remaining token names the primary key:
//! a named key (`enter`, `space`, ...), a decimal key code (`13`), or a
//! single character (uppercased, matching how specs are authored).
//!
//! Matching is exact: the active modifier set must equal the required set
//! (no partial match), and ALL matching combinations fire; there is no
//! first-match-wins short-circuit. Each match evaluates its expression in
//! its own mutation transaction, in registration order, with `$event`
//! injected.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty variation / no key token | Typo in spec | `MalformedConfig` at bind time |
//! | Unknown multi-char token | Typo in spec | `MalformedConfig` at bind time |
//! | Expression error mid-keystroke | Defect in handler | Logged, other matches still fire |

use std::rc::Rc;

use bitflags::bitflags;
use tracing::error;
use uibind_bridge::{BindError, EventHub, HandlerGuard};
use uibind_scope::{Expr, Locals, Scope, Value, ValueMap};

bitflags! {
    /// Required/active modifier set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const ALT = 1;
        const CTRL = 1 << 1;
        const SHIFT = 1 << 2;
    }
}

/// Which native key event stream a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Down,
    Press,
    Up,
}

impl KeyMode {
    /// Host event name for this mode.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Down => "keydown",
            Self::Press => "keypress",
            Self::Up => "keyup",
        }
    }
}

/// A normalized key event: numeric key code plus active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u32,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: u32, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Key event for a printable character.
    #[must_use]
    pub fn from_char(c: char, modifiers: Modifiers) -> Self {
        Self {
            code: c as u32,
            modifiers,
        }
    }

    /// Value view injected as `$event` into handler expressions.
    #[must_use]
    pub fn to_value(self) -> Value {
        let mut m = ValueMap::new();
        m.insert("code".into(), Value::Int(i64::from(self.code)));
        m.insert("alt".into(), Value::Bool(self.modifiers.contains(Modifiers::ALT)));
        m.insert("ctrl".into(), Value::Bool(self.modifiers.contains(Modifiers::CTRL)));
        m.insert(
            "shift".into(),
            Value::Bool(self.modifiers.contains(Modifiers::SHIFT)),
        );
        Value::Map(m)
    }

    /// Parse back from a `$event`-shaped map (hub delivery).
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let m = value.as_map()?;
        let code = u32::try_from(m.get("code")?.as_i64()?).ok()?;
        let mut modifiers = Modifiers::empty();
        for (name, flag) in [
            ("alt", Modifiers::ALT),
            ("ctrl", Modifiers::CTRL),
            ("shift", Modifiers::SHIFT),
        ] {
            if m.get(name).is_some_and(Value::is_truthy) {
                modifiers |= flag;
            }
        }
        Some(Self { code, modifiers })
    }
}

const NAMED_KEYS: &[(&str, u32)] = &[
    ("backspace", 8),
    ("tab", 9),
    ("enter", 13),
    ("esc", 27),
    ("space", 32),
    ("pageup", 33),
    ("pagedown", 34),
    ("end", 35),
    ("home", 36),
    ("left", 37),
    ("up", 38),
    ("right", 39),
    ("down", 40),
    ("insert", 45),
    ("delete", 46),
];

fn named_code(name: &str) -> Option<u32> {
    NAMED_KEYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// One parsed variation: required modifiers plus the primary key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combination {
    pub modifiers: Modifiers,
    pub code: u32,
}

impl Combination {
    /// Parse a full spec (space-separated variations).
    pub fn parse_spec(spec: &str) -> Result<Vec<Self>, BindError> {
        let variations: Vec<&str> = spec.split(' ').filter(|v| !v.is_empty()).collect();
        if variations.is_empty() {
            return Err(BindError::MalformedConfig(format!(
                "empty key combination spec: {spec:?}"
            )));
        }
        variations.iter().map(|v| Self::parse_variation(v)).collect()
    }

    /// Parse one dash-separated variation, e.g. `ctrl-shift-space`.
    pub fn parse_variation(variation: &str) -> Result<Self, BindError> {
        let mut modifiers = Modifiers::empty();
        let mut code = None;
        for token in variation.split('-') {
            match token {
                "" => {
                    return Err(BindError::MalformedConfig(format!(
                        "empty token in combination {variation:?}"
                    )));
                }
                "alt" | "meta" => modifiers |= Modifiers::ALT,
                "ctrl" => modifiers |= Modifiers::CTRL,
                "shift" => modifiers |= Modifiers::SHIFT,
                key => {
                    let parsed = parse_key_token(key).ok_or_else(|| {
                        BindError::MalformedConfig(format!(
                            "unknown key token {key:?} in combination {variation:?}"
                        ))
                    })?;
                    if code.replace(parsed).is_some() {
                        return Err(BindError::MalformedConfig(format!(
                            "multiple key tokens in combination {variation:?}"
                        )));
                    }
                }
            }
        }
        let code = code.ok_or_else(|| {
            BindError::MalformedConfig(format!("no key token in combination {variation:?}"))
        })?;
        Ok(Self { modifiers, code })
    }

    /// Exact match: same modifier set, same key code.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.modifiers == event.modifiers && self.code == event.code
    }
}

fn parse_key_token(token: &str) -> Option<u32> {
    if let Some(code) = named_code(token) {
        return Some(code);
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase() as u32),
        _ => None,
    }
}

/// Normalize a key event for matching: in press mode, unshifted ASCII
/// lowercase letters are reported uppercased, consistent with how specs
/// are authored.
#[must_use]
pub fn normalize(mode: KeyMode, event: KeyEvent) -> KeyEvent {
    let mut event = event;
    if mode == KeyMode::Press
        && !event.modifiers.contains(Modifiers::SHIFT)
        && (97..=122).contains(&event.code)
    {
        event.code -= 32;
    }
    event
}

/// Keyboard combination binding: a parsed spec table plus the scope the
/// handler expressions evaluate against.
pub struct KeypressBinding {
    scope: Scope,
    mode: KeyMode,
    combos: Vec<(Combination, Expr)>,
}

impl KeypressBinding {
    /// Parse all specs at bind time. Each `(spec, expression)` pair may
    /// expand into several combinations (space-separated variations).
    pub fn new(scope: &Scope, mode: KeyMode, specs: &[(&str, Expr)]) -> Result<Self, BindError> {
        let mut combos = Vec::new();
        for (spec, expr) in specs {
            for combination in Combination::parse_spec(spec)? {
                combos.push((combination, expr.clone()));
            }
        }
        Ok(Self {
            scope: scope.clone(),
            mode,
            combos,
        })
    }

    /// Number of parsed combinations.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.combos.len()
    }

    /// Handle one native key event: evaluate every matching combination,
    /// each in its own transaction, in registration order.
    ///
    /// Returns the number of combinations that fired.
    pub fn handle(&self, event: &KeyEvent) -> usize {
        let normalized = normalize(self.mode, *event);
        let mut fired = 0;
        for (combination, expr) in &self.combos {
            if !combination.matches(&normalized) {
                continue;
            }
            fired += 1;
            let expr = expr.clone();
            let locals = Locals::new().with("$event", event.to_value());
            let result = self.scope.apply(move |scope| {
                expr.eval(scope, &locals);
            });
            if let Err(e) = result {
                error!(mode = ?self.mode, error = %e, "key handler transaction failed");
            }
        }
        fired
    }

    /// Wire this binding to a host event hub. The returned guard must be
    /// held for the subscription to stay alive.
    #[must_use]
    pub fn attach(self: &Rc<Self>, hub: &EventHub) -> HandlerGuard {
        let binding = Rc::clone(self);
        hub.on(self.mode.event_name(), move |payload, _params| {
            if let Some(event) = KeyEvent::from_value(payload) {
                binding.handle(&event);
            }
        })
    }
}

impl std::fmt::Debug for KeypressBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypressBinding")
            .field("mode", &self.mode)
            .field("combinations", &self.combos.len())
            .finish()
    }
}
