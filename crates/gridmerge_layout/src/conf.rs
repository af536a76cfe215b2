//! Layout constants and builtin style ids.
//!
//! The numeric ids are opaque to the layout kernel. Their visual meaning lives
//! in the writer stylesheet (`gridmerge_io_xlsx::conf::derive_default_stylesheet`),
//! which must define every id listed here.

use crate::spec::StyleId;

/// First sheet row used by the composer when no origin is given (1-based).
pub const N_ROW_ORIGIN_DEFAULT: u32 = 1;
/// First sheet column used by the composer when no origin is given (1-based).
pub const N_COL_ORIGIN_DEFAULT: u32 = 1;

/// Builtin style ids shared by the resolver and the default stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnumStyleId {
    /// Plain cell.
    Default = 0,
    /// Bold font.
    Bold = 1,
    /// Italic font.
    Italic = 2,
    /// Times New Roman, 16pt.
    TimesRoman = 3,
    /// Yellow fill, centered, bordered.
    YellowFill = 4,
    /// Centered, no border.
    Alignment = 5,
    /// Thin border on all sides.
    Border = 6,
    /// Light blue fill, centered, bordered.
    LiteBlueFill = 7,
    /// Peach ("navy" in the legacy palette) fill, centered, bordered.
    NavyFill = 8,
    /// Centered with thin border.
    AlignmentWithBorder = 9,
    /// Thin border, forced text number format.
    BorderText = 10,
}

impl EnumStyleId {
    /// All builtin ids in ascending order.
    pub const ALL: [EnumStyleId; 11] = [
        EnumStyleId::Default,
        EnumStyleId::Bold,
        EnumStyleId::Italic,
        EnumStyleId::TimesRoman,
        EnumStyleId::YellowFill,
        EnumStyleId::Alignment,
        EnumStyleId::Border,
        EnumStyleId::LiteBlueFill,
        EnumStyleId::NavyFill,
        EnumStyleId::AlignmentWithBorder,
        EnumStyleId::BorderText,
    ];

    /// Raw style id.
    pub const fn id(self) -> StyleId {
        self as StyleId
    }

    /// Map a raw id back to its builtin name, if any.
    pub fn from_id(id: StyleId) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.id() == id)
    }
}

impl From<EnumStyleId> for StyleId {
    fn from(value: EnumStyleId) -> Self {
        value.id()
    }
}

/// Header-role fallback when no rule matches.
pub const STYLE_ID_HEADER_DEFAULT: StyleId = EnumStyleId::AlignmentWithBorder.id();
/// Row-role fallback when no rule matches.
pub const STYLE_ID_ROW_DEFAULT: StyleId = EnumStyleId::Border.id();
