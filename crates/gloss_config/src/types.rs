//! Configuration types deserialized from `gloss.toml`.

use gloss_common::Mode;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level configuration parsed from `gloss.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct GlossConfig {
    /// Development or production behavior.
    #[serde(default)]
    pub mode: Mode,
    /// Directory layout and placeholders.
    pub paths: PathsConfig,
    /// Named asset bundles, referenced from inputs as `@name`.
    #[serde(default)]
    pub assets: BTreeMap<String, AssetConfig>,
    /// Named filter definitions.
    #[serde(default)]
    pub filters: BTreeMap<String, FilterConfig>,
}

/// The `[paths]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Cache directory; built artifacts go in its `gloss` subdirectory.
    #[serde(default)]
    pub cache_dir: String,
    /// Project root. Defaults to the directory holding `gloss.toml`.
    #[serde(default)]
    pub root_dir: Option<String>,
    /// Public web directory holding production assets. Defaults to `<root_dir>/web`.
    #[serde(default)]
    pub web_dir: Option<String>,
    /// URL prefix under which development artifacts are served.
    #[serde(default = "default_dev_prefix")]
    pub dev_prefix: String,
    /// Extra substitutions applied to path-like values, e.g. `"@theme" = "assets/theme"`.
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
}

fn default_dev_prefix() -> String {
    "/_gloss".to_string()
}

/// A named bundle of inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Input files or placeholder-bearing paths. A single string is accepted.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub inputs: Vec<String>,
    /// Filters applied to any bundle that pulls this asset in.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub filters: Vec<String>,
}

/// A named filter definition.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Which built-in filter this configures.
    pub kind: FilterKind,
    /// Case-insensitive regex matched against file names to select inputs
    /// (and outputs) the filter applies to automatically.
    #[serde(default)]
    pub apply_to: Option<String>,
    /// Filter-specific options.
    #[serde(default)]
    pub options: toml::Table,
}

/// The built-in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Whitespace and comment stripping for scripts and stylesheets.
    Minify,
    /// Prepends a fixed text block.
    Banner,
}

impl FilterKind {
    /// The name used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Self::Minify => "minify",
            Self::Banner => "banner",
        }
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `inputs = "site.scss"` as shorthand for `inputs = ["site.scss"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_accepts_single_string_inputs() {
        let asset: AssetConfig = toml::from_str(r#"inputs = "site.scss""#).unwrap();
        assert_eq!(asset.inputs, vec!["site.scss"]);
        assert!(asset.filters.is_empty());
    }

    #[test]
    fn asset_accepts_input_lists() {
        let asset: AssetConfig =
            toml::from_str(r#"inputs = ["a.js", "b.js"]
filters = "banner""#)
                .unwrap();
        assert_eq!(asset.inputs, vec!["a.js", "b.js"]);
        assert_eq!(asset.filters, vec!["banner"]);
    }

    #[test]
    fn filter_kind_is_closed() {
        let ok: FilterConfig = toml::from_str(r#"kind = "minify""#).unwrap();
        assert_eq!(ok.kind, FilterKind::Minify);
        assert!(ok.apply_to.is_none());
        assert!(toml::from_str::<FilterConfig>(r#"kind = "uglify""#).is_err());
    }

    #[test]
    fn filter_options_are_kept_as_table() {
        let filter: FilterConfig = toml::from_str(
            r#"kind = "banner"
[options]
text = "hello"
"#,
        )
        .unwrap();
        assert_eq!(filter.kind.name(), "banner");
        assert_eq!(filter.options["text"].as_str(), Some("hello"));
    }
}
