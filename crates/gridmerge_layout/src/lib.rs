//! `gridmerge_layout` v1:
//! Grid layout and addressing kernel for multi-dataset spreadsheet sheets.
//!
//! Module layout:
//! - `conf`    : constants, builtin style ids and default presets
//! - `spec`    : datasets/tables/values, placed cells, merges, errors
//! - `address` : column letter encoder/decoder and A1 references
//! - `style`   : style rules and the role-based style resolver
//! - `header`  : header block and merge planner
//! - `compose` : grid composer (cursor-owning orchestration)
//! - `sample`  : seeded sample-data source
pub mod address;
pub mod compose;
pub mod conf;
pub mod header;
pub mod sample;
pub mod spec;
pub mod style;

pub use address::{decode_column, encode_column, format_cell_ref, format_range_ref};
pub use compose::{GridComposer, GridLayout, compose};
pub use conf::{EnumStyleId, STYLE_ID_HEADER_DEFAULT, STYLE_ID_ROW_DEFAULT};
pub use header::{EnumHeaderCellKind, SpecHeaderCell, SpecHeaderPlan, plan_header_block};
pub use sample::SampleSource;
pub use spec::{
    ConfigError, EnumCellRole, EnumCellValue, EnumDatasetLabelMode, EnumValueKind, LayoutError,
    SpecComposeOptions, SpecDataset, SpecMergeRegion, SpecPlacedCell, SpecTable, StyleId,
};
pub use style::{SpecStyleRule, StyleResolver, StyleRuleSet};
