//! XLSX writer kernel that serializes a built document into workbook bytes.

use rust_xlsxwriter::{
    Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet, XlsxError,
};

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::error::ExcelExportError;
use crate::spec::{SpecCellBorder, SpecCellFormat, SpecCellRange, SpecDocument, SpecFreezePane};

/// Serialize `doc` as a single-sheet workbook held in memory.
pub fn render_xlsx_bytes(doc: &SpecDocument) -> Result<Vec<u8>, ExcelExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(doc.sheet_name())
        .map_err(derive_xlsx_error)?;

    write_document(worksheet, doc)?;

    let v_bytes = workbook.save_to_buffer().map_err(derive_xlsx_error)?;
    log::debug!(
        "rendered sheet {:?}: {} bytes",
        doc.sheet_name(),
        v_bytes.len()
    );
    Ok(v_bytes)
}

fn write_document(worksheet: &mut Worksheet, doc: &SpecDocument) -> Result<(), ExcelExportError> {
    for (row_idx, row) in doc.rows().iter().enumerate() {
        for (col_idx, cell) in row.cells().iter().enumerate() {
            let format =
                derive_cell_format(cell.format.as_ref(), doc.cell_border(row_idx, col_idx));
            write_cell_with_format(worksheet, row_idx, col_idx, &cell.text, format.as_ref())?;
        }
    }

    for range in doc.merged_regions() {
        write_merge_region(worksheet, doc, range)?;
    }

    if let Some(pane) = doc.freeze_pane() {
        apply_freeze_pane(worksheet, &pane)?;
    }
    Ok(())
}

fn derive_cell_format(
    format: Option<&SpecCellFormat>,
    border: Option<&SpecCellBorder>,
) -> Option<SpecCellFormat> {
    match (format, border) {
        (None, None) => None,
        (Some(fmt), None) => Some(fmt.clone()),
        (fmt, Some(border)) => Some(fmt.cloned().unwrap_or_default().with_border(border)),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    text: &str,
    format: Option<&SpecCellFormat>,
) -> Result<(), ExcelExportError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;

    match (text.is_empty(), format) {
        (true, None) => {}
        (true, Some(fmt)) => {
            worksheet
                .write_blank(n_row, n_col, &derive_rust_xlsx_format(fmt))
                .map_err(derive_xlsx_error)?;
        }
        (false, None) => {
            worksheet
                .write_string(n_row, n_col, text)
                .map_err(derive_xlsx_error)?;
        }
        (false, Some(fmt)) => {
            worksheet
                .write_string_with_format(n_row, n_col, text, &derive_rust_xlsx_format(fmt))
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

// Merging keeps only the anchor style, so the outline is folded into the merge format.
fn write_merge_region(
    worksheet: &mut Worksheet,
    doc: &SpecDocument,
    range: &SpecCellRange,
) -> Result<(), ExcelExportError> {
    let c_text = doc
        .cell_text(range.first_row, range.first_col)
        .unwrap_or_default();
    let fmt_anchor = doc
        .cell(range.first_row, range.first_col)
        .and_then(|cell| cell.format.clone())
        .unwrap_or_default();

    let border_side = |row: usize, col: usize, side: fn(&SpecCellBorder) -> i64| {
        doc.cell_border(row, col).map_or(0, side)
    };
    let border_outline = SpecCellBorder {
        top: border_side(range.first_row, range.first_col, |b| b.top),
        bottom: border_side(range.last_row, range.first_col, |b| b.bottom),
        left: border_side(range.first_row, range.first_col, |b| b.left),
        right: border_side(range.first_row, range.last_col, |b| b.right),
    };

    worksheet
        .merge_range(
            cast_row_num(range.first_row)?,
            cast_col_num(range.first_col)?,
            cast_row_num(range.last_row)?,
            cast_col_num(range.last_col)?,
            c_text,
            &derive_rust_xlsx_format(&fmt_anchor.with_border(&border_outline)),
        )
        .map_err(derive_xlsx_error)?;
    Ok(())
}

fn apply_freeze_pane(
    worksheet: &mut Worksheet,
    pane: &SpecFreezePane,
) -> Result<(), ExcelExportError> {
    if pane.row_split == 0 && pane.col_split == 0 {
        return Ok(());
    }

    worksheet
        .set_freeze_panes(cast_row_num(pane.row_split)?, cast_col_num(pane.col_split)?)
        .map_err(derive_xlsx_error)?;

    if (pane.row_top_visible, pane.col_left_visible) != (pane.row_split, pane.col_split) {
        worksheet
            .set_freeze_panes_top_cell(
                cast_row_num(pane.row_top_visible)?,
                cast_col_num(pane.col_left_visible)?,
            )
            .map_err(derive_xlsx_error)?;
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    for val in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(val) {
            format = format.set_align(align);
        }
    }

    if let Some(val) = &spec.bg_color {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, ExcelExportError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(ExcelExportError::XlsxWrite(format!(
            "row index {value} exceeds Excel limit {N_NROWS_EXCEL_MAX}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| ExcelExportError::XlsxWrite(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, ExcelExportError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(ExcelExportError::XlsxWrite(format!(
            "column index {value} exceeds Excel limit {N_NCOLS_EXCEL_MAX}"
        )));
    }
    u16::try_from(value)
        .map_err(|_| ExcelExportError::XlsxWrite(format!("column index overflow: {value}")))
}

fn derive_xlsx_error(err: XlsxError) -> ExcelExportError {
    ExcelExportError::XlsxWrite(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
    use zip::ZipArchive;

    use super::*;
    use crate::builder::build_document;
    use crate::conf::derive_default_header_format;
    use crate::layout::{HeaderCell, LayoutConfig};
    use crate::testing::create_user;

    fn read_cell_text(v_bytes: &[u8], sheet_name: &str, pos: (u32, u32)) -> Option<String> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_bytes.to_vec())).unwrap();
        let range = workbook.worksheet_range(sheet_name).unwrap();
        match range.get_value(pos) {
            Some(Data::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn read_sheet_xml(v_bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(v_bytes.to_vec())).unwrap();
        let mut c_xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut c_xml)
            .unwrap();
        c_xml
    }

    #[test]
    fn test_render_round_trips_cell_text() {
        let layout = LayoutConfig {
            file_name: "users".to_string(),
            headers: vec![
                vec![HeaderCell::merged("People", "0,0,0,1"), HeaderCell::new("")],
                vec![HeaderCell::new("Name"), HeaderCell::new("Role")],
            ],
            fields: vec!["name".to_string(), "role.name".to_string()],
            sheet_name: Some("Users".to_string()),
            ..Default::default()
        };
        let l_users = vec![create_user("Ann", Some("admin"))];
        let doc = build_document(&layout, &l_users, &derive_default_header_format()).unwrap();

        let v_bytes = render_xlsx_bytes(&doc).unwrap();
        assert!(v_bytes.starts_with(b"PK"));

        assert_eq!(read_cell_text(&v_bytes, "Users", (0, 0)).as_deref(), Some("People"));
        assert_eq!(read_cell_text(&v_bytes, "Users", (1, 1)).as_deref(), Some("Role"));
        assert_eq!(read_cell_text(&v_bytes, "Users", (2, 0)).as_deref(), Some("Ann"));
        assert_eq!(read_cell_text(&v_bytes, "Users", (2, 1)).as_deref(), Some("admin"));
    }

    #[test]
    fn test_render_writes_merged_regions_and_freeze_pane() {
        let layout = LayoutConfig {
            file_name: "users".to_string(),
            headers: vec![
                vec![
                    HeaderCell::merged("People", "0,0,0,1"),
                    HeaderCell::new(""),
                    HeaderCell::merged("Since", "0,1,2,2"),
                ],
                vec![HeaderCell::new("Name"), HeaderCell::new("Role"), HeaderCell::new("")],
            ],
            fields: vec!["name".to_string(), "role.name".to_string()],
            ..Default::default()
        };
        let l_users = vec![create_user("Ann", Some("admin"))];
        let doc = build_document(&layout, &l_users, &derive_default_header_format()).unwrap();

        let c_xml = read_sheet_xml(&render_xlsx_bytes(&doc).unwrap());
        assert!(c_xml.contains(r#"<mergeCells count="2">"#), "{c_xml}");
        assert!(c_xml.contains(r#"<mergeCell ref="A1:B1"/>"#), "{c_xml}");
        assert!(c_xml.contains(r#"<mergeCell ref="C1:C2"/>"#), "{c_xml}");
        assert!(c_xml.contains(r#"topLeftCell="A3""#), "{c_xml}");
        assert!(c_xml.contains(r#"state="frozen""#), "{c_xml}");
    }

    #[test]
    fn test_render_rejects_cells_beyond_column_limit() {
        let mut doc = SpecDocument::new("Sheet0");
        let row = doc.append_row();
        for n_idx in 0..=N_NCOLS_EXCEL_MAX {
            row.append_cell(n_idx.to_string(), None);
        }

        let err = render_xlsx_bytes(&doc).unwrap_err();
        assert!(matches!(err, ExcelExportError::XlsxWrite(_)));
    }

    #[test]
    fn test_derive_cell_format_folds_border_into_style() {
        let border = SpecCellBorder {
            top: 1,
            ..Default::default()
        };
        assert_eq!(derive_cell_format(None, None), None);
        assert_eq!(derive_cell_format(None, Some(&border)).unwrap().top, Some(1));

        let fmt_header = derive_default_header_format();
        let fmt = derive_cell_format(Some(&fmt_header), Some(&border)).unwrap();
        assert_eq!(fmt.bold, Some(true));
        assert_eq!(fmt.top, Some(1));
        assert_eq!(fmt.bottom, None);
    }

    #[test]
    fn test_cast_indices_respect_excel_limits() {
        assert_eq!(cast_row_num(0).unwrap(), 0);
        assert!(cast_row_num(N_NROWS_EXCEL_MAX).is_err());
        assert_eq!(cast_col_num(N_NCOLS_EXCEL_MAX - 1).unwrap(), 16_383);
        assert!(cast_col_num(N_NCOLS_EXCEL_MAX).is_err());
    }
}
