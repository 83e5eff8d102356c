//! METS/MODS vocabulary: the path expressions and attribute names the
//! resolver queries.

/// All file groups of the file section.
pub const FILE_GROUPS: &str = "//mets:fileSec/mets:fileGrp";

/// The logical structure map.
pub const LOGICAL_MAP: &str = "//mets:structMap[@TYPE='LOGICAL']";

/// The physical structure map.
pub const PHYSICAL_MAP: &str = "//mets:structMap[@TYPE='PHYSICAL']";

/// The container standing for "every page of this print".
pub const PHYSICAL_ROOT_TYPE: &str = "physSequence";

/// Structure links between logical and physical divs.
pub const STRUCT_LINKS: &str = "//mets:structLink/mets:smLink";

/// Divs below a div.
pub const DIVS: &str = "mets:div";

/// File pointers of a physical div.
pub const FILE_POINTERS: &str = "mets:fptr";

/// MODS record inside a descriptive section.
pub const MODS: &str = "mets:mdWrap/mets:xmlData/mods:mods";

pub const ATTR_ID: &str = "ID";
pub const ATTR_TYPE: &str = "TYPE";
pub const ATTR_LABEL: &str = "LABEL";
pub const ATTR_ORDER_LABEL: &str = "ORDERLABEL";
pub const ATTR_DMDID: &str = "DMDID";
pub const ATTR_FILEID: &str = "FILEID";
pub const ATTR_CONTENTIDS: &str = "CONTENTIDS";
pub const ATTR_LINK_FROM: &str = "xlink:from";
pub const ATTR_LINK_TO: &str = "xlink:to";

/// Default file group used for paging.
pub const DEFAULT_IMAGE_GROUP: &str = "MAX";

/// Default file group holding full text.
pub const DEFAULT_OCR_GROUP: &str = "FULLTEXT";

/// `DMDID` may reference several sections separated by whitespace; the first
/// one is the section describing the div itself.
pub fn first_dmd_id(value: &str) -> Option<&str> {
    value.split_whitespace().next()
}
