//! Slot bindings and the per-processor option table.
//!
//! A [`SlotBinding`] is captured once at build time and knows how many
//! tokens its option consumes and where the coerced value lands. The
//! [`OptionTable`] owns the bindings of one processor together with the
//! shortcut map used by single-dash clusters.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ClusterMode;
use crate::error::{ArgError, Result};
use crate::queue::TokenQueue;
use crate::value::{SlotValue, Value, ValueType};

/// Writes a coerced value into the state object.
pub type Setter<S> = Box<dyn Fn(&mut S, Value) -> Result<()>>;

/// Plain field accessor used by option and command slots.
pub type SlotAccessor<S, T> = fn(&mut S) -> &mut T;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Triggered by `--key` or its shortcut.
    Option,
    /// Filled in declaration order from bare tokens.
    Positional,
}

pub struct SlotBinding<S> {
    key: String,
    shortcut: Option<char>,
    explicit_shortcut: bool,
    kind: SlotKind,
    value_type: ValueType,
    default: Value,
    must_exist: bool,
    setter: Setter<S>,
}

impl<S> SlotBinding<S> {
    pub fn new(key: impl Into<String>, value_type: ValueType, setter: Setter<S>) -> Self {
        let key = key.into();
        Self {
            shortcut: key.chars().next(),
            explicit_shortcut: false,
            key,
            kind: SlotKind::Option,
            value_type,
            default: value_type.default_value(),
            must_exist: false,
            setter,
        }
    }

    /// Bind an option to a field reached through `slot`.
    pub fn field<T: SlotValue>(key: impl Into<String>, slot: SlotAccessor<S, T>) -> Self
    where
        S: 'static,
    {
        let key = key.into();
        let slot_name = key.clone();
        let setter: Setter<S> = Box::new(move |state, value| {
            let found = value.value_type();
            let value = T::from_value(value).ok_or_else(|| {
                ArgError::slot_access(
                    &slot_name,
                    format!("expected {} value, got {}", T::VALUE_TYPE, found),
                )
            })?;
            *slot(state) = value;
            Ok(())
        });
        Self::new(key, T::VALUE_TYPE, setter)
    }

    /// Use `shortcut` instead of the first character of the key.
    pub fn with_shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self.explicit_shortcut = true;
        self
    }

    /// Register the option without any shortcut.
    pub fn without_shortcut(mut self) -> Self {
        self.shortcut = None;
        self.explicit_shortcut = false;
        self
    }

    pub fn with_kind(mut self, kind: SlotKind) -> Self {
        self.kind = kind;
        self
    }

    /// Require file values to name an existing file.
    pub fn must_exist(mut self) -> Self {
        self.must_exist = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn shortcut(&self) -> Option<char> {
        self.shortcut
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Consume zero or one token from `queue` and write the value.
    pub fn apply(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        if !self.value_type.takes_value() {
            return self.assign(state, Value::Bool(true));
        }
        let token = queue.remove().ok_or_else(|| ArgError::MissingValue {
            key: self.key.clone(),
        })?;
        self.apply_token(&token, state)
    }

    /// Coerce an already extracted token and write it.
    pub fn apply_token(&self, token: &str, state: &mut S) -> Result<()> {
        let value = self.value_type.parse(&self.key, token)?;
        if self.must_exist {
            require_file(token);
        }
        self.assign(state, value)
    }

    pub fn assign(&self, state: &mut S, value: Value) -> Result<()> {
        debug!(key = %self.key, ?value, "binding option");
        (self.setter)(state, value)
    }
}

/// A missing required file ends the process; it is not a recoverable error.
fn require_file(name: &str) {
    if !Path::new(name).is_file() {
        eprintln!("File does not exist: '{}'", name);
        std::process::exit(1);
    }
}

impl<S> std::fmt::Debug for SlotBinding<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotBinding")
            .field("key", &self.key)
            .field("shortcut", &self.shortcut)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .field("must_exist", &self.must_exist)
            .finish_non_exhaustive()
    }
}

struct ShortcutEntry {
    key: String,
    explicit: bool,
}

/// Long-key bindings plus the shortcut map of one processor.
pub struct OptionTable<S> {
    bindings: BTreeMap<String, SlotBinding<S>>,
    shortcuts: BTreeMap<char, ShortcutEntry>,
}

impl<S> Default for OptionTable<S> {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
            shortcuts: BTreeMap::new(),
        }
    }
}

impl<S> OptionTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding.
    ///
    /// Keys must be unique. A derived shortcut (first letter of the key)
    /// yields to any shortcut already taken; an explicit shortcut replaces
    /// a derived one and collides with another explicit one.
    pub fn insert(&mut self, binding: SlotBinding<S>) -> Result<()> {
        let key = binding.key.clone();
        if key.is_empty() {
            return Err(ArgError::configuration("option key must not be empty"));
        }
        if self.bindings.contains_key(&key) {
            return Err(ArgError::configuration(format!(
                "option '--{}' is registered twice",
                key
            )));
        }

        if let Some(shortcut) = binding.shortcut {
            match self.shortcuts.get(&shortcut) {
                None => {
                    self.shortcuts.insert(
                        shortcut,
                        ShortcutEntry {
                            key: key.clone(),
                            explicit: binding.explicit_shortcut,
                        },
                    );
                }
                Some(taken) if binding.explicit_shortcut && taken.explicit => {
                    return Err(ArgError::configuration(format!(
                        "shortcut '-{}' of '--{}' is already used by '--{}'",
                        shortcut, key, taken.key
                    )));
                }
                Some(taken) if binding.explicit_shortcut => {
                    debug!(shortcut = %shortcut, from = %taken.key, to = %key, "explicit shortcut takes over");
                    self.shortcuts.insert(
                        shortcut,
                        ShortcutEntry {
                            key: key.clone(),
                            explicit: true,
                        },
                    );
                }
                Some(taken) => {
                    debug!(shortcut = %shortcut, key = %key, owner = %taken.key, "derived shortcut already taken");
                }
            }
        }

        self.bindings.insert(key, binding);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&SlotBinding<S>> {
        self.bindings.get(key)
    }

    pub fn by_shortcut(&self, shortcut: char) -> Option<&SlotBinding<S>> {
        self.shortcuts
            .get(&shortcut)
            .and_then(|entry| self.bindings.get(&entry.key))
    }

    /// Effective shortcut of `key`, if one resolves to it.
    pub fn shortcut_of(&self, key: &str) -> Option<char> {
        self.shortcuts
            .iter()
            .find(|(_, entry)| entry.key == key)
            .map(|(c, _)| *c)
    }

    /// Shortcut → long key pairs, ordered by shortcut.
    pub fn shortcuts(&self) -> impl Iterator<Item = (char, &str)> {
        self.shortcuts.iter().map(|(c, entry)| (*c, entry.key.as_str()))
    }

    /// Bindings ordered by key.
    pub fn bindings(&self) -> impl Iterator<Item = &SlotBinding<S>> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Handle one token starting with `-`, already removed from the queue.
    ///
    /// Unknown long options and unknown cluster characters are dropped.
    pub fn dispatch(
        &self,
        token: &str,
        queue: &mut TokenQueue,
        state: &mut S,
        mode: ClusterMode,
    ) -> Result<()> {
        if let Some(key) = token.strip_prefix("--") {
            return match self.bindings.get(key) {
                Some(binding) => binding.apply(queue, state),
                None => {
                    warn!(option = %token, "ignoring unknown option");
                    Ok(())
                }
            };
        }

        let cluster = token.strip_prefix('-').unwrap_or(token);
        for (idx, shortcut) in cluster.char_indices() {
            let Some(binding) = self.by_shortcut(shortcut) else {
                warn!(flag = %shortcut, token = %token, "ignoring unknown short option");
                continue;
            };
            if mode == ClusterMode::Attached && binding.value_type().takes_value() {
                let rest = &cluster[idx + shortcut.len_utf8()..];
                if !rest.is_empty() {
                    return binding.apply_token(rest, state);
                }
            }
            binding.apply(queue, state)?;
        }
        Ok(())
    }
}
