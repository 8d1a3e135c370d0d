//! Field resolver: dotted field paths against records.

use crate::conf::C_PATH_SEPARATOR;
use crate::error::ExcelExportError;
use crate::formatter::format_field_value;
use crate::record::{EnumFieldValue, EnumRecordShape, FieldAccess};

/// Resolve `path` against `record` and render the value as cell text.
///
/// - Absent record or empty path yields `""`.
/// - Mapping records look `path` up as one whole key; a missing key yields `""`.
/// - Structured records resolve one segment at a time. A null intermediate
///   value short-circuits to `""`; a member that does not exist fails with
///   [`ExcelExportError::FieldNotFound`].
///
/// The leaf pattern is the member's own pattern, then its accessor pattern,
/// then `pattern_column`, then the default of the value's kind.
pub fn resolve_field_text(
    record: &dyn FieldAccess,
    path: &str,
    pattern_column: Option<&str>,
) -> Result<String, ExcelExportError> {
    resolve_path_segment(record, path, path, pattern_column)
}

fn resolve_path_segment(
    record: &dyn FieldAccess,
    path_rest: &str,
    path_full: &str,
    pattern_column: Option<&str>,
) -> Result<String, ExcelExportError> {
    if record.is_null() || path_rest.is_empty() {
        return Ok(String::new());
    }

    if record.shape() == EnumRecordShape::Mapping {
        return Ok(record
            .get_field(path_rest)
            .map(|value| format_field_value(&value, pattern_column))
            .unwrap_or_default());
    }

    let Some((c_head, c_rest)) = path_rest.split_once(C_PATH_SEPARATOR) else {
        let value = derive_member(record, path_rest, path_full)?;
        let pattern = select_member_pattern(record, path_rest, pattern_column);
        return Ok(format_field_value(&value, pattern));
    };

    match derive_member(record, c_head, path_full)? {
        EnumFieldValue::Null => Ok(String::new()),
        EnumFieldValue::Record(nested) => {
            resolve_path_segment(nested, c_rest, path_full, pattern_column)
        }
        _ => {
            let c_member = c_rest
                .split_once(C_PATH_SEPARATOR)
                .map_or(c_rest, |(c_next, _)| c_next);
            Err(ExcelExportError::FieldNotFound {
                path: path_full.to_string(),
                member: c_member.to_string(),
            })
        }
    }
}

fn derive_member<'a>(
    record: &'a dyn FieldAccess,
    name: &str,
    path_full: &str,
) -> Result<EnumFieldValue<'a>, ExcelExportError> {
    record
        .get_field(name)
        .ok_or_else(|| ExcelExportError::FieldNotFound {
            path: path_full.to_string(),
            member: name.to_string(),
        })
}

fn select_member_pattern<'a>(
    record: &'a dyn FieldAccess,
    name: &str,
    pattern_column: Option<&'a str>,
) -> Option<&'a str> {
    record
        .get_field_pattern(name)
        .or_else(|| record.get_accessor_pattern(name))
        .or(pattern_column)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::testing::{User, create_user};

    #[test]
    fn test_absent_record_or_empty_path_yields_empty() {
        let record_none: Option<User> = None;
        assert_eq!(resolve_field_text(&record_none, "name", None).unwrap(), "");
        assert_eq!(resolve_field_text(&record_none, "no.such", None).unwrap(), "");

        let user = create_user("Ann", None);
        assert_eq!(resolve_field_text(&user, "", None).unwrap(), "");
    }

    #[test]
    fn test_mapping_keys_are_matched_whole() {
        let mut dict_record = HashMap::new();
        dict_record.insert("a.b".to_string(), "x".to_string());

        assert_eq!(resolve_field_text(&dict_record, "a.b", None).unwrap(), "x");
        assert_eq!(resolve_field_text(&dict_record, "a", None).unwrap(), "");
        assert_eq!(resolve_field_text(&dict_record, "missing", None).unwrap(), "");
    }

    #[test]
    fn test_nested_members_resolve_segment_by_segment() {
        let user = create_user("Ann", Some("admin"));
        assert_eq!(resolve_field_text(&user, "name", None).unwrap(), "Ann");
        assert_eq!(resolve_field_text(&user, "role.name", None).unwrap(), "admin");
        assert_eq!(resolve_field_text(&user, "age", None).unwrap(), "30");
    }

    #[test]
    fn test_null_intermediate_short_circuits() {
        let user = create_user("Ann", None);
        assert_eq!(resolve_field_text(&user, "role.name", None).unwrap(), "");
        assert_eq!(resolve_field_text(&user, "role.no.such", None).unwrap(), "");
    }

    #[test]
    fn test_mapping_nested_in_structured_record_uses_whole_rest() {
        let user = create_user("Ann", None);
        assert_eq!(
            resolve_field_text(&user, "attrs.team.code", None).unwrap(),
            "T-Ann"
        );
    }

    #[test]
    fn test_missing_member_is_field_not_found() {
        let user = create_user("Ann", Some("admin"));

        let err = resolve_field_text(&user, "role.title", None).unwrap_err();
        assert!(matches!(
            err,
            ExcelExportError::FieldNotFound { ref path, ref member }
                if path == "role.title" && member == "title"
        ));

        let err = resolve_field_text(&user, "name.first", None).unwrap_err();
        assert!(matches!(
            err,
            ExcelExportError::FieldNotFound { ref member, .. } if member == "first"
        ));
    }

    #[test]
    fn test_pattern_precedence_member_then_accessor_then_column() {
        let user = create_user("Ann", Some("admin"));

        assert_eq!(
            resolve_field_text(&user, "birthday", Some("yyyy.MM")).unwrap(),
            "05/03/2024"
        );
        assert_eq!(
            resolve_field_text(&user, "joinedAt", Some("yyyy.MM")).unwrap(),
            "2024/03/05 09:05"
        );
        assert_eq!(
            resolve_field_text(&user, "role.since", Some("yyyy.MM")).unwrap(),
            "2024.03"
        );
        assert_eq!(
            resolve_field_text(&user, "role.since", None).unwrap(),
            "2024-03-05"
        );
    }

    #[test]
    fn test_mapping_values_use_column_pattern() {
        let mut dict_record: BTreeMap<String, chrono::NaiveDate> = BTreeMap::new();
        dict_record.insert("day".to_string(), crate::testing::create_date());

        assert_eq!(
            resolve_field_text(&dict_record, "day", Some("dd.MM.yyyy")).unwrap(),
            "05.03.2024"
        );
        assert_eq!(resolve_field_text(&dict_record, "day", None).unwrap(), "2024-03-05");
    }
}
