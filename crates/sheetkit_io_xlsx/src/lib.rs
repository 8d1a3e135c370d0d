//! `sheetkit_io_xlsx` v1:
//! Layout-driven XLSX export of record collections.
//!
//! Modules:
//! - `conf`      : constants and default presets
//! - `spec`      : document model, formats, options
//! - `layout`    : YAML layout descriptor and validation
//! - `record`    : structural field access for records
//! - `formatter` : value to cell text, date patterns
//! - `resolver`  : dotted field path resolution
//! - `util`      : pure helper functions
//! - `builder`   : layout + records to document
//! - `writer`    : document to workbook bytes
//! - `export`    : store / stream orchestration
pub mod builder;
pub mod conf;
pub mod error;
pub mod export;
pub mod formatter;
pub mod layout;
pub mod record;
pub mod resolver;
pub mod spec;
pub mod util;
pub mod writer;

#[cfg(test)]
mod testing;

pub use builder::build_document;
pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use error::ExcelExportError;
pub use export::{ExcelExporter, render_xlsx_payload};
pub use formatter::{EnumPatternItem, convert_date_pattern, format_field_value};
pub use layout::{
    EnumRecordLayout, HeaderCell, LayoutConfig, load_layout_config, parse_layout_config_yaml,
};
pub use record::{EnumFieldValue, EnumRecordShape, FieldAccess, ToFieldValue};
pub use resolver::resolve_field_text;
pub use spec::{
    SpecCellBorder, SpecCellFormat, SpecCellRange, SpecDocument, SpecDocumentCell,
    SpecDocumentRow, SpecExportOptions, SpecFreezePane, SpecXlsxPayload,
};
pub use util::{plan_merge_region_borders, sanitize_sheet_name};
pub use writer::render_xlsx_bytes;
