//! Shape-based classification of resource-pack entries.

use std::fmt;

use crate::path::Path;

/// Directory name that holds language tables.
pub const LANGUAGE_DIR: &str = "lang";

/// Extension of a single language table.
pub const LANGUAGE_PART_EXTENSION: &str = "json";

/// Semantic kind of an entry, the hook used by higher-level editors.
///
/// Classification only looks at the path, never at content, so a `.json`
/// file that happens to sit in a directory named `lang` is a
/// [`FileType::LanguagePart`] whatever it contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FileType {
    /// Anything that is not recognized.
    #[default]
    None,
    /// A `lang` container.
    Language,
    /// A `.json` table directly inside a `lang` container.
    LanguagePart,
}

impl FileType {
    /// Classifies `path` by its shape.
    ///
    /// ```
    /// use resvfs::{FileType, Path};
    ///
    /// assert_eq!(FileType::classify(&Path::new("/assets/mod/lang")), FileType::Language);
    /// assert_eq!(
    ///     FileType::classify(&Path::new("/assets/mod/lang/en_us.json")),
    ///     FileType::LanguagePart
    /// );
    /// assert_eq!(FileType::classify(&Path::new("/assets/mod/lang/readme.txt")), FileType::None);
    /// ```
    pub fn classify(path: &Path) -> FileType {
        match path.file_name() {
            Some(LANGUAGE_DIR) => FileType::Language,
            Some(_)
                if path.extension() == Some(LANGUAGE_PART_EXTENSION)
                    && path.parent().file_name() == Some(LANGUAGE_DIR) =>
            {
                FileType::LanguagePart
            }
            _ => FileType::None,
        }
    }

    /// Short lowercase label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            FileType::None => "none",
            FileType::Language => "language",
            FileType::LanguagePart => "language-part",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
