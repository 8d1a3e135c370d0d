//! XLSX constants and default preset factories.

use crate::spec::{SpecCellBorder, SpecCellFormat};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Default worksheet name.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet0";
/// Artifact / download extension.
pub const C_EXTENSION_XLSX: &str = "xlsx";
/// Binary content type handed to transports.
pub const C_CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Separator of merge / freeze coordinate lists.
pub const C_INDEX_SEPARATOR: char = ',';
/// Separator of field path segments.
pub const C_PATH_SEPARATOR: char = '.';

/// Default pattern for date-only values.
pub const C_PATTERN_DATE: &str = "yyyy-MM-dd";
/// Default pattern for time-only values.
pub const C_PATTERN_TIME: &str = "HH:mm:ss";
/// Default pattern for date-and-time values.
pub const C_PATTERN_DATE_TIME: &str = "yyyy-MM-dd HH:mm:ss";

/// Border style index for thin borders.
pub const N_BORDER_THIN: i64 = 1;

/// Build the shared header style: thin box, centered, bold, wrapped, solid sky-blue fill.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        bold: Some(true),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        border: Some(N_BORDER_THIN),
        text_wrap: Some(true),
        bg_color: Some("#00CCFF".to_string()),
        ..Default::default()
    }
}

/// Border applied on the outer edges of merged regions.
pub fn derive_merge_region_border() -> SpecCellBorder {
    SpecCellBorder {
        top: N_BORDER_THIN,
        bottom: N_BORDER_THIN,
        left: N_BORDER_THIN,
        right: N_BORDER_THIN,
    }
}
