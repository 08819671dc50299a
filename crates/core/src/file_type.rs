//! File categories and the sections that group them.
//!
//! Every stored file falls into exactly one [`FileType`]. The category is derived from the file
//! extension at upload time and never re-derived afterwards; readers trust the stored value but
//! reject anything outside the closed set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "csv", "rtf", "ods", "ppt", "odp", "md", "html",
    "htm", "epub", "pages", "fig", "psd", "ai", "indd", "xd", "sketch", "afdesign", "afphoto",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Document,
    Video,
    Audio,
    Other,
}

/// A stored type string that is not one of the five categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised file type '{0}'")]
pub struct ParseFileTypeError(pub String);

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Image,
        FileType::Document,
        FileType::Video,
        FileType::Audio,
        FileType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Document => "document",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = ParseFileTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "document" => Ok(FileType::Document),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "other" => Ok(FileType::Other),
            _ => Err(ParseFileTypeError(s.to_string())),
        }
    }
}

/// Derives the category and lowercase extension of a file name.
///
/// The extension is the text after the last `.`; a name without one (or ending in `.`) has an
/// empty extension and is classified as [`FileType::Other`].
pub fn classify(file_name: &str) -> (FileType, String) {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let ext = extension.as_str();
    let file_type = if DOCUMENT_EXTENSIONS.contains(&ext) {
        FileType::Document
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        FileType::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        FileType::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        FileType::Audio
    } else {
        FileType::Other
    };

    (file_type, extension)
}

/// A browsing section: one page of the file listing, covering one or more categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Documents,
    Images,
    Media,
    Others,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Documents,
        Section::Images,
        Section::Media,
        Section::Others,
    ];

    /// Parses a route slug. Unknown slugs fall back to [`Section::Documents`].
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "images" => Section::Images,
            "media" => Section::Media,
            "others" => Section::Others,
            _ => Section::Documents,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Section::Documents => "documents",
            Section::Images => "images",
            Section::Media => "media",
            Section::Others => "others",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Documents => "Documents",
            Section::Images => "Images",
            Section::Media => "Media",
            Section::Others => "Others",
        }
    }

    /// Categories listed on this section's page.
    pub fn types(&self) -> &'static [FileType] {
        match self {
            Section::Documents => &[FileType::Document],
            Section::Images => &[FileType::Image],
            Section::Media => &[FileType::Video, FileType::Audio],
            Section::Others => &[FileType::Other],
        }
    }

    /// Section a file of the given category is shown in.
    pub fn for_type(file_type: FileType) -> Self {
        match file_type {
            FileType::Document => Section::Documents,
            FileType::Image => Section::Images,
            FileType::Video | FileType::Audio => Section::Media,
            FileType::Other => Section::Others,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify("report.PDF"), (FileType::Document, "pdf".into()));
        assert_eq!(classify("holiday.jpeg"), (FileType::Image, "jpeg".into()));
        assert_eq!(classify("clip.final.mp4"), (FileType::Video, "mp4".into()));
        assert_eq!(classify("song.flac"), (FileType::Audio, "flac".into()));
        assert_eq!(classify("archive.zip"), (FileType::Other, "zip".into()));
    }

    #[test]
    fn test_classify_without_extension() {
        assert_eq!(classify("Makefile"), (FileType::Other, String::new()));
        assert_eq!(classify("trailing."), (FileType::Other, String::new()));
    }

    #[test]
    fn test_file_type_parse_is_closed() {
        for file_type in FileType::ALL {
            assert_eq!(file_type.as_str().parse::<FileType>(), Ok(file_type));
        }
        assert_eq!(
            "spreadsheet".parse::<FileType>(),
            Err(ParseFileTypeError("spreadsheet".into()))
        );
        assert!("Image".parse::<FileType>().is_err());
    }

    #[test]
    fn test_section_types() {
        assert_eq!(Section::from_slug("documents").types(), &[FileType::Document]);
        assert_eq!(Section::from_slug("images").types(), &[FileType::Image]);
        assert_eq!(
            Section::from_slug("media").types(),
            &[FileType::Video, FileType::Audio]
        );
        assert_eq!(Section::from_slug("others").types(), &[FileType::Other]);
    }

    #[test]
    fn test_unknown_section_falls_back_to_documents() {
        assert_eq!(Section::from_slug("spreadsheets"), Section::Documents);
        assert_eq!(Section::from_slug(""), Section::Documents);
    }

    #[test]
    fn test_section_for_type_round_trips() {
        for section in Section::ALL {
            for file_type in section.types() {
                assert_eq!(Section::for_type(*file_type), section);
            }
            assert_eq!(Section::from_slug(section.slug()), section);
        }
    }
}
