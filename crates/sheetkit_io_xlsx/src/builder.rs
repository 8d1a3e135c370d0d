//! Document builder: header grid, data cells, merge borders, freeze pane.

use crate::conf::derive_merge_region_border;
use crate::error::ExcelExportError;
use crate::layout::{EnumRecordLayout, LayoutConfig};
use crate::record::FieldAccess;
use crate::resolver::resolve_field_text;
use crate::spec::{SpecCellFormat, SpecDocument, SpecDocumentRow};
use crate::util::{derive_cell_range, plan_merge_region_borders, validate_disjoint_cell_ranges};

/// Build the sheet document for `records` under `layout`.
///
/// Header cells carry `fmt_header`; data cells carry no explicit style.
/// Merge regions are registered while the header is written and outlined
/// afterwards. Any field resolution error aborts the build with
/// [`ExcelExportError::DocumentGenerationFailed`].
pub fn build_document<R: FieldAccess>(
    layout: &LayoutConfig,
    records: &[R],
    fmt_header: &SpecCellFormat,
) -> Result<SpecDocument, ExcelExportError> {
    let mut doc = SpecDocument::new(layout.derive_sheet_name());

    let mut l_ranges_merge = Vec::new();
    for row_header in &layout.headers {
        let row = doc.append_row();
        for cell_header in row_header {
            row.append_cell(cell_header.name.as_str(), Some(fmt_header.clone()));
            if let Some(c_merge_index) = cell_header.merge_index.as_deref() {
                let range = derive_cell_range(c_merge_index)
                    .map_err(ExcelExportError::ConfigValidation)?;
                l_ranges_merge.push(range);
            }
        }
    }
    validate_disjoint_cell_ranges(&l_ranges_merge).map_err(ExcelExportError::ConfigValidation)?;
    for range in &l_ranges_merge {
        doc.add_merged_region(*range);
    }

    if !records.is_empty() {
        match layout.record_layout {
            EnumRecordLayout::SharedRow => {
                let row = doc.append_row();
                for record in records {
                    append_record_cells(row, layout, record)?;
                }
            }
            EnumRecordLayout::RowPerRecord => {
                for record in records {
                    append_record_cells(doc.append_row(), layout, record)?;
                }
            }
        }
    }

    doc.apply_borders(plan_merge_region_borders(
        &l_ranges_merge,
        &derive_merge_region_border(),
    ));
    let pane = layout.derive_freeze_pane()?;
    doc.create_freeze_pane(pane);

    log::debug!(
        "built sheet {:?}: rows={} merges={} records={} fields={} freeze=({}, {})",
        doc.sheet_name(),
        doc.n_rows_physical(),
        doc.merged_regions().len(),
        records.len(),
        layout.fields.len(),
        pane.col_split,
        pane.row_split
    );
    Ok(doc)
}

fn append_record_cells(
    row: &mut SpecDocumentRow,
    layout: &LayoutConfig,
    record: &dyn FieldAccess,
) -> Result<(), ExcelExportError> {
    for c_field in &layout.fields {
        let c_text = resolve_field_text(record, c_field, layout.column_pattern(c_field))
            .map_err(ExcelExportError::into_generation_failure)?;
        row.append_cell(c_text, None);
    }
    Ok(())
}
