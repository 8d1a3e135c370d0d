//! Layout descriptor: header grid, field paths, merge and freeze coordinates.
//!
//! Layouts are static YAML descriptors resolved by the caller:
//!
//! ```yaml
//! fileName: users
//! headers:
//!   - - name: Name
//!     - name: Contact
//!       mergeIndex: "0,0,1,2"
//!   - - name: ""
//!     - name: Mail
//!     - name: Phone
//! fields: [name, contact.mail, contact.phone]
//! freezePaneIndex: "0,2,0,2"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExcelExportError;
use crate::spec::{SpecCellRange, SpecFreezePane, derive_default_sheet_name};
use crate::util::{
    derive_cell_range, derive_freeze_pane, sanitize_sheet_name, validate_disjoint_cell_ranges,
};

/// How records are laid out below the header grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumRecordLayout {
    /// Every record's cells are appended into one shared data row.
    #[default]
    SharedRow,
    /// One data row per record.
    RowPerRecord,
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    /// Display text.
    pub name: String,
    /// `firstRow,lastRow,firstCol,lastCol`, zero-based and inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_index: Option<String>,
}

impl HeaderCell {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            merge_index: None,
        }
    }

    pub fn merged(name: impl Into<String>, merge_index: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            merge_index: Some(merge_index.into()),
        }
    }
}

/// Export layout for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Base name of generated artifacts.
    #[serde(default)]
    pub file_name: String,
    /// Header grid, row by row.
    #[serde(default)]
    pub headers: Vec<Vec<HeaderCell>>,
    /// Dotted field paths, one per data column.
    #[serde(default)]
    pub fields: Vec<String>,
    /// `col,row,leftCol,topRow`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_pane_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// Column-level date patterns keyed by field path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formats: BTreeMap<String, String>,
    #[serde(default)]
    pub record_layout: EnumRecordLayout,
}

impl LayoutConfig {
    /// Check required fields and every coordinate string.
    pub fn validate(&self) -> Result<(), ExcelExportError> {
        if self.file_name.trim().is_empty() {
            return Err(ExcelExportError::ConfigValidation(
                "fileName must not be empty.".to_string(),
            ));
        }
        if self.fields.is_empty() {
            return Err(ExcelExportError::ConfigValidation(
                "fields must not be empty.".to_string(),
            ));
        }
        self.derive_merge_ranges()?;
        self.derive_freeze_pane()?;
        Ok(())
    }

    /// Merge ranges of all header cells, in header order.
    pub fn derive_merge_ranges(&self) -> Result<Vec<SpecCellRange>, ExcelExportError> {
        let mut l_ranges = Vec::new();
        for c_merge_index in self
            .headers
            .iter()
            .flatten()
            .filter_map(|cell| cell.merge_index.as_deref())
        {
            l_ranges.push(
                derive_cell_range(c_merge_index).map_err(ExcelExportError::ConfigValidation)?,
            );
        }
        validate_disjoint_cell_ranges(&l_ranges).map_err(ExcelExportError::ConfigValidation)?;
        Ok(l_ranges)
    }

    /// Configured freeze pane, or the header-row default.
    pub fn derive_freeze_pane(&self) -> Result<SpecFreezePane, ExcelExportError> {
        derive_freeze_pane(self.freeze_pane_index.as_deref(), self.headers.len())
            .map_err(ExcelExportError::ConfigValidation)
    }

    /// Sanitized worksheet name.
    pub fn derive_sheet_name(&self) -> String {
        match self.sheet_name.as_deref() {
            Some(c_name) => sanitize_sheet_name(c_name, "_"),
            None => derive_default_sheet_name(),
        }
    }

    /// Column-level pattern for `field`.
    pub fn column_pattern(&self, field: &str) -> Option<&str> {
        self.formats.get(field).map(String::as_str)
    }
}

/// Parse a layout from YAML text.
pub fn parse_layout_config_yaml(text: &str) -> Result<LayoutConfig, ExcelExportError> {
    serde_yaml::from_str(text).map_err(|e| ExcelExportError::ConfigParse(e.to_string()))
}

/// Read and parse a layout YAML file.
pub fn load_layout_config(path: impl AsRef<Path>) -> Result<LayoutConfig, ExcelExportError> {
    let path = path.as_ref();
    let c_text = fs::read_to_string(path).map_err(|source| ExcelExportError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded layout config from {}", path.display());
    parse_layout_config_yaml(&c_text)
}
