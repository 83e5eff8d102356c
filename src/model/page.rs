//! Physical pages and the files attached to them.

use std::borrow::Cow;

/// A file of a file group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct FileRef {
    /// `ID` of the `mets:file`.
    pub id: String,
    /// `USE` of the enclosing `mets:fileGrp`.
    pub group: String,
    /// `xlink:href` of the file location.
    pub href: String,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub mimetype: Option<String>,
}

impl FileRef {
    /// Percent-decoded last path segment of the href, without query string.
    ///
    /// Derivative generators use this to name the local copy of the file.
    pub fn local_name(&self) -> Cow<'_, str> {
        let path = self.href.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or(path);
        percent_encoding::percent_decode_str(segment).decode_utf8_lossy()
    }
}

/// One entry of the physical page sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct PhysicalPage {
    /// 1-based position in the paging file group.
    pub order: u32,
    /// `ID` of the physical div, if the file belongs to one.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub physical_id: Option<String>,
    /// `ORDERLABEL`, else `LABEL` of the physical div.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub label: Option<String>,
    /// Granular content identifier (`CONTENTIDS`), e.g. a page URN.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub content_ids: Option<String>,
    /// The paging file first, then files of other groups for the same page.
    pub files: Vec<FileRef>,
}

impl PhysicalPage {
    /// The file of this page in `group`.
    pub fn file(&self, group: &str) -> Option<&FileRef> {
        self.files.iter().find(|f| f.group == group)
    }

    /// The file this page was paged by.
    pub fn image(&self) -> Option<&FileRef> {
        self.files.first()
    }
}
