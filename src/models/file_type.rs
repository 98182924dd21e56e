use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extension → classifier table, using the `lastKnownFileType` vocabulary.
const BY_EXTENSION: &[(&str, &str)] = &[
    ("swift", "sourcecode.swift"),
    ("m", "sourcecode.c.objc"),
    ("mm", "sourcecode.cpp.objcpp"),
    ("c", "sourcecode.c.c"),
    ("h", "sourcecode.c.h"),
    ("cc", "sourcecode.cpp.cpp"),
    ("cpp", "sourcecode.cpp.cpp"),
    ("cxx", "sourcecode.cpp.cpp"),
    ("hpp", "sourcecode.cpp.h"),
    ("metal", "sourcecode.metal"),
    ("s", "sourcecode.asm"),
    ("sh", "text.script.sh"),
    ("py", "text.script.python"),
    ("rb", "text.script.ruby"),
    ("plist", "text.plist.xml"),
    ("strings", "text.plist.strings"),
    ("json", "text.json"),
    ("xml", "text.xml"),
    ("md", "net.daringfireball.markdown"),
    ("png", "image.png"),
    ("jpg", "image.jpeg"),
    ("jpeg", "image.jpeg"),
    ("gif", "image.gif"),
    ("pdf", "image.pdf"),
    ("svg", "image.svg"),
    ("xcassets", "folder.assetcatalog"),
    ("storyboard", "file.storyboard"),
    ("xib", "file.xib"),
    ("entitlements", "text.plist.entitlements"),
    ("xcconfig", "text.xcconfig"),
    ("framework", "wrapper.framework"),
];

const FALLBACK: &str = "text";

/// The file-type classifier of a file reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileType(String);

impl FileType {
    pub fn new(classifier: impl Into<String>) -> Self {
        Self(classifier.into())
    }

    /// Classifies a file by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        let classifier = extension
            .as_deref()
            .and_then(|ext| {
                BY_EXTENSION
                    .iter()
                    .find(|(known, _)| *known == ext)
                    .map(|(_, classifier)| *classifier)
            })
            .unwrap_or(FALLBACK);
        Self(classifier.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_source_code(&self) -> bool {
        self.0.starts_with("sourcecode")
    }

    pub fn is_script(&self) -> bool {
        self.0 == "text.script" || self.0.starts_with("text.script.")
    }

    pub fn is_image(&self) -> bool {
        self.0.starts_with("image")
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str) -> FileType {
        FileType::from_path(Path::new(path))
    }

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify("App/main.swift").as_str(), "sourcecode.swift");
        assert_eq!(classify("Legacy/View.m").as_str(), "sourcecode.c.objc");
        assert_eq!(classify("Info.plist").as_str(), "text.plist.xml");
        assert_eq!(classify("Assets.xcassets").as_str(), "folder.assetcatalog");
        assert_eq!(classify("Logo.PNG").as_str(), "image.png");
    }

    #[test]
    fn unknown_extensions_fall_back_to_text() {
        assert_eq!(classify("LICENSE").as_str(), "text");
        assert_eq!(classify("notes.txtx").as_str(), "text");
    }

    #[test]
    fn source_and_script_predicates() {
        assert!(classify("a.swift").is_source_code());
        assert!(classify("a.h").is_source_code());
        assert!(classify("build.sh").is_script());
        assert!(FileType::new("text.script").is_script());
        assert!(!FileType::new("text.scripting").is_script());
        assert!(!classify("Info.plist").is_source_code());
        assert!(classify("icon.jpg").is_image());
    }
}
