//! Employee records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::EmployeeCode;

/// An employee as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub code: EmployeeCode,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Employee {
    pub fn new(
        code: EmployeeCode,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            email: email.into(),
            role: role.into(),
            department: None,
            designation: None,
            phone: None,
            join_date: None,
            location: None,
        }
    }

    /// Uppercased first letter of each word in the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// `Name (CODE)`.
    pub fn full_display_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.trim().eq_ignore_ascii_case(role.trim())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    pub fn is_manager(&self) -> bool {
        self.has_role("manager")
    }

    /// Operators are treated as regular employees.
    pub fn is_employee(&self) -> bool {
        self.has_role("employee") || self.has_role("operator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, role: &str) -> Employee {
        Employee::new(
            EmployeeCode::new("EMP001").unwrap(),
            name,
            "someone@example.com",
            role,
        )
    }

    #[test]
    fn initials_from_each_word() {
        assert_eq!(employee("ada  lovelace", "employee").initials(), "AL");
        assert_eq!(employee("Grace Brewster Hopper", "employee").initials(), "GBH");
        assert_eq!(employee("", "employee").initials(), "");
    }

    #[test]
    fn display_name_includes_code() {
        assert_eq!(
            employee("Ada Lovelace", "employee").full_display_name(),
            "Ada Lovelace (EMP001)"
        );
    }

    #[test]
    fn role_checks_ignore_case() {
        assert!(employee("A", "Admin").is_admin());
        assert!(employee("A", "MANAGER").is_manager());
        assert!(employee("A", "operator").is_employee());
        assert!(employee("A", "Employee").is_employee());
        assert!(!employee("A", "manager").is_employee());
        assert!(employee("A", "auditor").has_role("Auditor"));
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let json = r#"{"code":"EMP002","name":"Lin","email":"lin@example.com","role":"employee"}"#;
        let parsed: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.department, None);
        assert_eq!(parsed.code.as_str(), "EMP002");
    }
}
