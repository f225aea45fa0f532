// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// The file kinds the workspace accepts.
///
/// Text kinds open in the editor; binary kinds are listed in the project tree
/// but never loaded into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    Html,
    Css,
    JavaScript,
    Json,
    Markdown,
    PlainText,
    Svg,
    Png,
    Jpeg,
    Gif,
    Ico,
}

impl FileKind {
    /// Maps a lowercase file extension to its kind; unknown extensions are
    /// unsupported and rejected at ingestion time.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "html" | "htm" => Some(Self::Html),
            "css" => Some(Self::Css),
            "js" => Some(Self::JavaScript),
            "json" => Some(Self::Json),
            "md" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = name.rsplit('.').next()?;
        Self::from_extension(extension.to_ascii_lowercase().as_str())
    }

    /// Whether files of this kind open as editable text buffers.
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Png | Self::Jpeg | Self::Gif | Self::Ico)
    }

    /// Whether documents of this kind drive the live preview pane.
    pub fn has_preview(&self) -> bool {
        matches!(self, Self::Html)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::JavaScript => "js",
            Self::Json => "json",
            Self::Markdown => "md",
            Self::PlainText => "txt",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Ico => "ico",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::FileKind;

    #[rstest]
    #[case("Index.HTML", Some(FileKind::Html))]
    #[case("page.htm", Some(FileKind::Html))]
    #[case("logo.PNG", Some(FileKind::Png))]
    #[case("photo.jpeg", Some(FileKind::Jpeg))]
    #[case("notes.md", Some(FileKind::Markdown))]
    #[case("data.json", Some(FileKind::Json))]
    #[case("archive.tar.gz", None)]
    #[case("binary", None)]
    fn maps_file_names_to_kinds(#[case] name: &str, #[case] expected: Option<FileKind>) {
        assert_eq!(FileKind::from_file_name(name), expected);
    }

    #[test]
    fn image_kinds_are_not_editable() {
        assert!(!FileKind::Png.is_editable());
        assert!(!FileKind::Ico.is_editable());
        assert!(FileKind::Svg.is_editable());
        assert!(FileKind::Html.is_editable());
    }

    #[test]
    fn only_html_drives_the_preview() {
        assert!(FileKind::Html.has_preview());
        assert!(!FileKind::Css.has_preview());
        assert!(!FileKind::Markdown.has_preview());
    }
}
