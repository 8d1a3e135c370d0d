//! Stateless helper utilities used by the layout model and the document builder.

use std::collections::BTreeMap;

use crate::conf::{
    C_INDEX_SEPARATOR, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{SpecCellBorder, SpecCellRange, SpecFreezePane};

////////////////////////////////////////////////////////////////////////////////
// #region CoordinateParsing

/// Parse four comma-separated non-negative integers.
pub fn parse_index_quad(index: &str) -> Result<[usize; 4], String> {
    let l_parts: Vec<&str> = index.split(C_INDEX_SEPARATOR).map(str::trim).collect();
    if l_parts.len() != 4 {
        return Err(format!(
            "Expected 4 comma-separated integers, got {} in {index:?}.",
            l_parts.len()
        ));
    }

    let mut arr_quad = [0usize; 4];
    for (n_idx, c_part) in l_parts.iter().enumerate() {
        arr_quad[n_idx] = c_part
            .parse::<usize>()
            .map_err(|_| format!("Not a non-negative integer: {c_part:?} in {index:?}."))?;
    }
    Ok(arr_quad)
}

/// Derive a merge range from `firstRow,lastRow,firstCol,lastCol`.
pub fn derive_cell_range(merge_index: &str) -> Result<SpecCellRange, String> {
    let [first_row, last_row, first_col, last_col] = parse_index_quad(merge_index)?;
    let range = SpecCellRange {
        first_row,
        last_row,
        first_col,
        last_col,
    };

    if first_row > last_row || first_col > last_col {
        return Err(format!(
            "Merge range {merge_index:?} has first index after last index."
        ));
    }
    if range.is_single_cell() {
        return Err(format!("Merge range {merge_index:?} covers a single cell."));
    }
    if last_row >= N_NROWS_EXCEL_MAX || last_col >= N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "Merge range {merge_index:?} exceeds Excel limits \
             ({N_NROWS_EXCEL_MAX} rows, {N_NCOLS_EXCEL_MAX} cols)."
        ));
    }
    Ok(range)
}

/// Derive the freeze pane from `col,row,leftCol,topRow`.
///
/// An absent index, or one without a separator, freezes `n_rows_header` rows
/// and no columns.
pub fn derive_freeze_pane(
    freeze_index: Option<&str>,
    n_rows_header: usize,
) -> Result<SpecFreezePane, String> {
    let Some(c_index) = freeze_index.filter(|c| c.contains(C_INDEX_SEPARATOR)) else {
        return Ok(SpecFreezePane::new(0, n_rows_header));
    };

    let [col_split, row_split, col_left_visible, row_top_visible] = parse_index_quad(c_index)?;
    let if_rows_ok = row_split.max(row_top_visible) < N_NROWS_EXCEL_MAX;
    let if_cols_ok = col_split.max(col_left_visible) < N_NCOLS_EXCEL_MAX;
    if !(if_rows_ok && if_cols_ok) {
        return Err(format!("Freeze pane {c_index:?} exceeds Excel limits."));
    }
    Ok(SpecFreezePane {
        col_split,
        row_split,
        col_left_visible,
        row_top_visible,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeRegionUtils

/// Validate that no two merge ranges share a cell.
pub fn validate_disjoint_cell_ranges(ranges: &[SpecCellRange]) -> Result<(), String> {
    for (n_idx, range_a) in ranges.iter().enumerate() {
        for range_b in &ranges[n_idx + 1..] {
            if range_a.overlaps(range_b) {
                return Err(format!(
                    "Merge ranges overlap: {range_a:?} and {range_b:?}."
                ));
            }
        }
    }
    Ok(())
}

/// Build border plan that outlines each merge range with `border`.
///
/// Only the outer edge of every range is styled; interior cells are left out.
pub fn plan_merge_region_borders(
    ranges: &[SpecCellRange],
    border: &SpecCellBorder,
) -> BTreeMap<(usize, usize), SpecCellBorder> {
    let mut dict_plan_merge_border: BTreeMap<(usize, usize), SpecCellBorder> = BTreeMap::new();

    for range in ranges {
        for row_idx in range.first_row..=range.last_row {
            for col_idx in range.first_col..=range.last_col {
                let border_cell = SpecCellBorder {
                    top: if row_idx == range.first_row { border.top } else { 0 },
                    bottom: if row_idx == range.last_row {
                        border.bottom
                    } else {
                        0
                    },
                    left: if col_idx == range.first_col {
                        border.left
                    } else {
                        0
                    },
                    right: if col_idx == range.last_col {
                        border.right
                    } else {
                        0
                    },
                };
                if border_cell == SpecCellBorder::default() {
                    continue;
                }
                dict_plan_merge_border
                    .entry((row_idx, col_idx))
                    .or_default()
                    .overlay(&border_cell);
            }
        }
    }

    dict_plan_merge_border
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
