use crate::error::{FormatError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::path::Path;

/// Locale consulted when the requested one has no entry.
pub const FALLBACK_LOCALE: &str = "en";

const BUILTIN_TEMPLATES: &str = include_str!("../../assets/templates.json");

/// Template key → locale code → format string with `{named}` placeholders.
///
/// Read-only once the assistant is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TemplateRegistry {
    entries: HashMap<String, HashMap<String, String>>,
}

impl TemplateRegistry {
    /// Templates shipped with the crate (hi, bn, mr, or, ta, te, en).
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TEMPLATES)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Entries of `other` replace entries with the same key and locale.
    pub fn merge(&mut self, other: TemplateRegistry) {
        for (key, locales) in other.entries {
            self.entries.entry(key).or_default().extend(locales);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Exact locale first, then [`FALLBACK_LOCALE`].
    pub fn lookup(&self, key: &str, locale: &str) -> Option<&str> {
        let locales = self.entries.get(key)?;
        locales
            .get(locale)
            .or_else(|| locales.get(FALLBACK_LOCALE))
            .map(String::as_str)
    }
}

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Renders template keys into display text for a locale.
#[derive(Debug, Clone)]
pub struct ResponseLocalizer {
    registry: TemplateRegistry,
}

impl ResponseLocalizer {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Renders `key` for `locale`.
    ///
    /// An unknown key renders as the empty string. A placeholder without a
    /// matching field is a [`FormatError`]; it is never silently dropped.
    pub fn render(&self, key: &str, locale: &str, fields: &Fields) -> std::result::Result<String, FormatError> {
        match self.registry.lookup(key, locale) {
            Some(template) => substitute(key, template, fields),
            None => Ok(String::new()),
        }
    }
}

/// Python `str.format` subset: `{name}` placeholders, `{{` and `}}` escapes.
fn substitute(key: &str, template: &str, fields: &Fields) -> std::result::Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed || name.contains('{') {
                    return Err(FormatError::UnbalancedBrace {
                        template: key.to_string(),
                        position,
                    });
                }
                let value = fields.get(&name).ok_or_else(|| FormatError::MissingField {
                    template: key.to_string(),
                    field: name.clone(),
                })?;
                out.push_str(value);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(FormatError::UnbalancedBrace {
                    template: key.to_string(),
                    position,
                });
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
