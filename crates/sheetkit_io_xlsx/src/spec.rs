//! Shared XLSX specification models.

use std::collections::BTreeMap;

use sheetkit_io_fs::SpecArtifactStoreOptions;

use crate::conf::{C_SHEET_NAME_DEFAULT, derive_default_header_format};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Solid background fill color (`#RRGGBB`).
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }

    /// Overlay the non-zero sides of `border` as per-side overrides.
    pub fn with_border(&self, border: &SpecCellBorder) -> SpecCellFormat {
        let side = |n_style: i64| if n_style > 0 { Some(n_style) } else { None };
        self.with_(SpecCellFormat {
            top: side(border.top),
            bottom: side(border.bottom),
            left: side(border.left),
            right: side(border.right),
            ..Default::default()
        })
    }
}

/// Border tuple for top/bottom/left/right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCellBorder {
    /// Top border style.
    pub top: i64,
    /// Bottom border style.
    pub bottom: i64,
    /// Left border style.
    pub left: i64,
    /// Right border style.
    pub right: i64,
}

impl SpecCellBorder {
    /// Overlay non-zero sides of `other` onto `self`.
    pub fn overlay(&mut self, other: &SpecCellBorder) {
        if other.top > 0 {
            self.top = other.top;
        }
        if other.bottom > 0 {
            self.bottom = other.bottom;
        }
        if other.left > 0 {
            self.left = other.left;
        }
        if other.right > 0 {
            self.right = other.right;
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GeometrySpecification

/// Inclusive, zero-based rectangular cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecCellRange {
    /// First row (inclusive).
    pub first_row: usize,
    /// Last row (inclusive).
    pub last_row: usize,
    /// First column (inclusive).
    pub first_col: usize,
    /// Last column (inclusive).
    pub last_col: usize,
}

impl SpecCellRange {
    /// Whether the range covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }

    /// Whether two ranges share at least one cell.
    pub fn overlaps(&self, other: &SpecCellRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }
}

/// Freeze pane: split position plus first visible cell of the scrolling area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFreezePane {
    /// Number of frozen columns.
    pub col_split: usize,
    /// Number of frozen rows.
    pub row_split: usize,
    /// First visible column right of the split.
    pub col_left_visible: usize,
    /// First visible row below the split.
    pub row_top_visible: usize,
}

impl SpecFreezePane {
    /// Freeze `n_rows` leading rows and `n_cols` leading columns.
    pub fn new(n_cols: usize, n_rows: usize) -> Self {
        Self {
            col_split: n_cols,
            row_split: n_rows,
            col_left_visible: n_cols,
            row_top_visible: n_rows,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentSpecification

/// One cell of the document grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDocumentCell {
    /// Display text.
    pub text: String,
    /// Explicit style; data cells carry none.
    pub format: Option<SpecCellFormat>,
}

/// One row of the document grid. Cells are only appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecDocumentRow {
    cells: Vec<SpecDocumentCell>,
}

impl SpecDocumentRow {
    /// Append a cell at the next physical column.
    pub fn append_cell(
        &mut self,
        text: impl Into<String>,
        format: Option<SpecCellFormat>,
    ) -> &mut SpecDocumentCell {
        self.cells.push(SpecDocumentCell {
            text: text.into(),
            format,
        });
        let n_idx_last = self.cells.len() - 1;
        &mut self.cells[n_idx_last]
    }

    /// Number of cells actually created.
    pub fn n_cells_physical(&self) -> usize {
        self.cells.len()
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[SpecDocumentCell] {
        &self.cells
    }
}

/// Single-sheet grid document produced by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDocument {
    sheet_name: String,
    rows: Vec<SpecDocumentRow>,
    merged_regions: Vec<SpecCellRange>,
    borders_by_cell: BTreeMap<(usize, usize), SpecCellBorder>,
    freeze_pane: Option<SpecFreezePane>,
}

impl SpecDocument {
    /// Create an empty document for one worksheet.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            rows: Vec::new(),
            merged_regions: Vec::new(),
            borders_by_cell: BTreeMap::new(),
            freeze_pane: None,
        }
    }

    /// Worksheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Append a row at the next physical row index.
    pub fn append_row(&mut self) -> &mut SpecDocumentRow {
        self.rows.push(SpecDocumentRow::default());
        let n_idx_last = self.rows.len() - 1;
        &mut self.rows[n_idx_last]
    }

    /// Number of rows actually created.
    pub fn n_rows_physical(&self) -> usize {
        self.rows.len()
    }

    /// Rows in order.
    pub fn rows(&self) -> &[SpecDocumentRow] {
        &self.rows
    }

    /// Cell at `(row, col)` when it was created.
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecDocumentCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Text of the cell at `(row, col)` when it was created.
    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.text.as_str())
    }

    /// Register a merged region.
    pub fn add_merged_region(&mut self, range: SpecCellRange) {
        self.merged_regions.push(range);
    }

    /// Registered merged regions, in registration order.
    pub fn merged_regions(&self) -> &[SpecCellRange] {
        &self.merged_regions
    }

    /// Overlay a per-cell border plan.
    pub fn apply_borders(&mut self, plan: BTreeMap<(usize, usize), SpecCellBorder>) {
        for (pos_cell, border) in plan {
            self.borders_by_cell
                .entry(pos_cell)
                .or_default()
                .overlay(&border);
        }
    }

    /// Border applied to `(row, col)` after merge styling, if any.
    pub fn cell_border(&self, row: usize, col: usize) -> Option<&SpecCellBorder> {
        self.borders_by_cell.get(&(row, col))
    }

    /// Whole border plan keyed by `(row, col)`.
    pub fn borders(&self) -> &BTreeMap<(usize, usize), SpecCellBorder> {
        &self.borders_by_cell
    }

    /// Set the freeze pane, replacing any previous one.
    pub fn create_freeze_pane(&mut self, pane: SpecFreezePane) {
        self.freeze_pane = Some(pane);
    }

    /// Current freeze pane.
    pub fn freeze_pane(&self) -> Option<SpecFreezePane> {
        self.freeze_pane
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportSpecification

/// Serialized workbook ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxPayload {
    /// Suggested download file name, including extension.
    pub file_name: String,
    /// Binary content type marker.
    pub content_type: &'static str,
    /// Workbook bytes.
    pub bytes: Vec<u8>,
}

/// Exporter-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportOptions {
    /// Style applied to every header cell.
    pub format_header: SpecCellFormat,
    /// Temporary artifact storage options.
    pub artifact_store: SpecArtifactStoreOptions,
}

impl Default for SpecExportOptions {
    fn default() -> Self {
        Self {
            format_header: derive_default_header_format(),
            artifact_store: SpecArtifactStoreOptions::default(),
        }
    }
}

/// Default worksheet name used when the layout has none.
pub(crate) fn derive_default_sheet_name() -> String {
    C_SHEET_NAME_DEFAULT.to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
