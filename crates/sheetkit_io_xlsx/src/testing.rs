//! Sample records shared by unit tests.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::record::{EnumFieldValue, FieldAccess, ToFieldValue};

pub(crate) struct Role {
    pub(crate) name: String,
    pub(crate) since: NaiveDate,
}

impl FieldAccess for Role {
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        match name {
            "name" => Some(self.name.to_field_value()),
            "since" => Some(self.since.to_field_value()),
            _ => None,
        }
    }
}

pub(crate) struct User {
    pub(crate) name: String,
    pub(crate) age: Option<u32>,
    pub(crate) role: Option<Role>,
    pub(crate) birthday: NaiveDate,
    pub(crate) joined_at: NaiveDateTime,
    pub(crate) attrs: BTreeMap<String, String>,
}

impl FieldAccess for User {
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        match name {
            "name" => Some(self.name.to_field_value()),
            "age" => Some(self.age.to_field_value()),
            "role" => Some(EnumFieldValue::from_record(self.role.as_ref())),
            "birthday" => Some(self.birthday.to_field_value()),
            "joinedAt" => Some(self.joined_at.to_field_value()),
            "attrs" => Some(EnumFieldValue::Record(&self.attrs)),
            _ => None,
        }
    }

    fn get_field_pattern(&self, name: &str) -> Option<&str> {
        match name {
            "birthday" => Some("dd/MM/yyyy"),
            _ => None,
        }
    }

    fn get_accessor_pattern(&self, name: &str) -> Option<&str> {
        match name {
            "birthday" => Some("yyyy"),
            "joinedAt" => Some("yyyy/MM/dd HH:mm"),
            _ => None,
        }
    }
}

pub(crate) fn create_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).expect("date")
}

pub(crate) fn create_date_time() -> NaiveDateTime {
    create_date().and_time(NaiveTime::from_hms_opt(9, 5, 7).expect("time"))
}

pub(crate) fn create_user(name: &str, role_name: Option<&str>) -> User {
    let mut attrs = BTreeMap::new();
    attrs.insert("team.code".to_string(), format!("T-{name}"));

    User {
        name: name.to_string(),
        age: Some(30),
        role: role_name.map(|c_role| Role {
            name: c_role.to_string(),
            since: create_date(),
        }),
        birthday: create_date(),
        joined_at: create_date_time(),
        attrs,
    }
}
