//! Asset classification by file extension.

use std::path::Path;

/// Stylesheet source dialects that support `@import` of other source files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleDialect {
    /// LESS (`.less`).
    Less,
    /// SCSS (`.scss`).
    Scss,
    /// Indented Sass (`.sass`).
    Sass,
}

impl StyleDialect {
    /// Detects the dialect from a bare extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "less" => Some(Self::Less),
            "scss" => Some(Self::Scss),
            "sass" => Some(Self::Sass),
            _ => None,
        }
    }

    /// Detects the dialect of the file at `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether imports may name an underscore-prefixed partial without the
    /// underscore or the extension.
    pub fn supports_partials(self) -> bool {
        matches!(self, Self::Scss | Self::Sass)
    }
}

/// Broad category of an asset file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// JavaScript (`.js`).
    Script,
    /// Plain CSS (`.css`).
    Stylesheet,
    /// A stylesheet source that compiles to CSS.
    StyleSource(StyleDialect),
    /// A raster or vector image.
    Image,
    /// A web font.
    Font,
    /// Anything else.
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "svg", "tif"];
const FONT_EXTENSIONS: &[&str] = &["otf", "eot", "ttf", "woff", "woff2"];

impl AssetKind {
    /// Classifies the file at `path` by its extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Self::Other,
        };
        if let Some(dialect) = StyleDialect::from_extension(&ext) {
            return Self::StyleSource(dialect);
        }
        match ext.as_str() {
            "js" => Self::Script,
            "css" => Self::Stylesheet,
            e if IMAGE_EXTENSIONS.contains(&e) => Self::Image,
            e if FONT_EXTENSIONS.contains(&e) => Self::Font,
            _ => Self::Other,
        }
    }

    /// Whether files of this kind may import other files and therefore need
    /// a transitive freshness check.
    pub fn is_import_capable(self) -> bool {
        matches!(self, Self::StyleSource(_))
    }

    /// Whether files of this kind are copied verbatim rather than compiled.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Image | Self::Font)
    }
}
