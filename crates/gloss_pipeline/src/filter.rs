//! Built-in text filters and the registry that configures them.
//!
//! Each filter kind has a static table of `(option, setter)` pairs. Option
//! keys from configuration are normalized (`-` becomes `_`, case folded)
//! before lookup, so `preserve-comments` and `Preserve_Comments` both reach
//! the same setter.

use std::collections::BTreeMap;
use std::path::Path;

use gloss_config::{FilterConfig, FilterKind};
use regex::{Regex, RegexBuilder};
use toml::Value;

use crate::error::FilterError;

type Setter<T> = fn(&mut T, &Value) -> Result<(), String>;

/// Strips comments and blank lines and trims indentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinifyFilter {
    /// Keep `/* ... */` comments. `/*! ... */` comments are always kept.
    pub preserve_comments: bool,
}

static MINIFY_OPTIONS: &[(&str, Setter<MinifyFilter>)] =
    &[("preserve_comments", set_preserve_comments)];

fn set_preserve_comments(filter: &mut MinifyFilter, value: &Value) -> Result<(), String> {
    filter.preserve_comments = value.as_bool().ok_or("expected a boolean")?;
    Ok(())
}

/// Prepends a fixed block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerFilter {
    /// Text placed before the content. Empty means the filter does nothing.
    pub text: String,
    /// Placed between the banner and the content.
    pub separator: String,
}

impl Default for BannerFilter {
    fn default() -> Self {
        Self {
            text: String::new(),
            separator: "\n".to_string(),
        }
    }
}

static BANNER_OPTIONS: &[(&str, Setter<BannerFilter>)] =
    &[("text", set_banner_text), ("separator", set_banner_separator)];

fn set_banner_text(filter: &mut BannerFilter, value: &Value) -> Result<(), String> {
    filter.text = value.as_str().ok_or("expected a string")?.to_string();
    Ok(())
}

fn set_banner_separator(filter: &mut BannerFilter, value: &Value) -> Result<(), String> {
    filter.separator = value.as_str().ok_or("expected a string")?.to_string();
    Ok(())
}

/// A configured filter of one of the built-in kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// See [`MinifyFilter`].
    Minify(MinifyFilter),
    /// See [`BannerFilter`].
    Banner(BannerFilter),
}

impl Filter {
    /// A filter of `kind` with default options.
    pub fn new(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Minify => Self::Minify(MinifyFilter::default()),
            FilterKind::Banner => Self::Banner(BannerFilter::default()),
        }
    }

    /// Builds a filter of `kind` and applies `options` through its setter table.
    ///
    /// `name` is only used in error messages.
    pub fn configure(
        name: &str,
        kind: FilterKind,
        options: &toml::Table,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new(kind);
        for (key, value) in options {
            let normalized = normalize_key(key);
            let outcome = match &mut filter {
                Self::Minify(f) => run_setter(MINIFY_OPTIONS, f, &normalized, value),
                Self::Banner(f) => run_setter(BANNER_OPTIONS, f, &normalized, value),
            };
            match outcome {
                None => {
                    return Err(FilterError::UnknownOption {
                        filter: name.to_string(),
                        key: key.clone(),
                    })
                }
                Some(Err(reason)) => {
                    return Err(FilterError::InvalidOption {
                        filter: name.to_string(),
                        key: key.clone(),
                        value: value.to_string(),
                        reason,
                    })
                }
                Some(Ok(())) => {}
            }
        }
        Ok(filter)
    }

    /// Runs the filter over `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Minify(f) => minify(text, f.preserve_comments),
            Self::Banner(f) if f.text.is_empty() => text.to_string(),
            Self::Banner(f) => format!("{}{}{}", f.text, f.separator, text),
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.replace('-', "_").to_ascii_lowercase()
}

fn run_setter<T>(
    table: &[(&str, Setter<T>)],
    target: &mut T,
    key: &str,
    value: &Value,
) -> Option<Result<(), String>> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, set)| set(target, value))
}

fn minify(text: &str, preserve_comments: bool) -> String {
    let body = if preserve_comments {
        text.to_string()
    } else {
        strip_block_comments(text)
    };
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes `/* */` comments outside string literals, keeping `/*! */` ones.
///
/// A `//` line comment is copied through untouched, so a `/*` inside it
/// never opens a block comment.
fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(c);
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    out.push(n);
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let keep = chars.peek() == Some(&'!');
                let mut comment = String::from("/*");
                let mut prev = '\0';
                for n in chars.by_ref() {
                    comment.push(n);
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                if keep {
                    out.push_str(&comment);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// A filter together with its configured name and `apply_to` pattern.
#[derive(Debug, Clone)]
pub struct NamedFilter {
    /// The name under `[filters]`.
    pub name: String,
    /// Case-insensitive pattern selecting files automatically.
    pub apply_to: Option<Regex>,
    /// The configured filter.
    pub filter: Filter,
}

impl NamedFilter {
    /// Returns `true` if the `apply_to` pattern matches `file`.
    pub fn matches(&self, file: &Path) -> bool {
        self.apply_to
            .as_ref()
            .is_some_and(|re| re.is_match(&file.to_string_lossy()))
    }
}

/// All configured filters, in name order.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<NamedFilter>,
}

impl FilterSet {
    /// Builds every filter under `[filters]`.
    pub fn from_config(config: &BTreeMap<String, FilterConfig>) -> Result<Self, FilterError> {
        let mut filters = Vec::with_capacity(config.len());
        for (name, fc) in config {
            let apply_to = fc
                .apply_to
                .as_deref()
                .map(|pattern| {
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| FilterError::InvalidPattern {
                            filter: name.clone(),
                            reason: e.to_string(),
                        })
                })
                .transpose()?;
            filters.push(NamedFilter {
                name: name.clone(),
                apply_to,
                filter: Filter::configure(name, fc.kind, &fc.options)?,
            });
        }
        Ok(Self { filters })
    }

    /// Looks up a filter by name.
    pub fn get(&self, name: &str) -> Option<&NamedFilter> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Number of configured filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter is configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters to run for `file`: `explicit` first, then every
    /// filter whose `apply_to` matches, without repeats.
    pub fn names_for(&self, file: &Path, explicit: &[String]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let matching = self
            .filters
            .iter()
            .filter(|f| f.matches(file))
            .map(|f| &f.name);
        for name in explicit.iter().chain(matching) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Runs the named filters over `text` in order.
    pub fn apply(&self, names: &[String], text: String) -> Result<String, FilterError> {
        names.iter().try_fold(text, |acc, name| {
            self.get(name)
                .map(|f| f.filter.apply(&acc))
                .ok_or_else(|| FilterError::UnknownFilter(name.clone()))
        })
    }

    /// Runs the filters [`FilterSet::names_for`] selects for `file`.
    pub fn apply_for(
        &self,
        file: &Path,
        explicit: &[String],
        text: String,
    ) -> Result<String, FilterError> {
        self.apply(&self.names_for(file, explicit), text)
    }
}
