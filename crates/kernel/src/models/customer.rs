//! Customer model and field validation.
//!
//! A customer is the single entity managed by the kernel. The persistent
//! store owns its lifetime; this module only describes its shape, the
//! validated field set written on create/update, and the raw draft that
//! callers submit before validation.

use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum lengths (in characters) of the text attributes.
pub const NAME_MAX_LEN: usize = 50;
pub const PHONE_MAX_LEN: usize = 15;
pub const ORGANIZATION_MAX_LEN: usize = 50;
pub const CONTRACT_MAX_LEN: usize = 15;
pub const TAX_ID_MAX_LEN: usize = 20;
pub const RESPONSIBLE_ID_MAX_LEN: usize = 15;
pub const EMAIL_MAX_LEN: usize = 25;
pub const CONTACT_EMAIL_MAX_LEN: usize = 100;

/// Final status of a customer, stored as a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
    #[serde(rename = "C")]
    Canceled,
}

impl FinalStatus {
    /// Single-character storage code.
    pub fn code(self) -> &'static str {
        match self {
            FinalStatus::Active => "A",
            FinalStatus::Inactive => "I",
            FinalStatus::Canceled => "C",
        }
    }

    /// Parse a storage code (`A`, `I`, `C`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(FinalStatus::Active),
            "I" => Some(FinalStatus::Inactive),
            "C" => Some(FinalStatus::Canceled),
            _ => None,
        }
    }

    /// Parse user input: a code in either case or the status word.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "a" | "active" => Some(FinalStatus::Active),
            "i" | "inactive" => Some(FinalStatus::Inactive),
            "c" | "canceled" | "cancelled" => Some(FinalStatus::Canceled),
            _ => None,
        }
    }
}

/// Customer record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier. Never reused.
    pub id: i64,

    #[serde(flatten)]
    pub fields: CustomerFields,
}

/// Validated customer attributes, everything except the identifier.
///
/// Values of this type only come out of [`CustomerDraft::validate`] or a
/// store read, so required text is non-empty and every length and format
/// constraint holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub name: String,
    pub phone: String,
    pub organization: String,
    pub contract: String,
    pub dispatch_count: i32,
    pub last_dispatch: Option<NaiveDate>,
    pub tax_id: Option<String>,
    pub responsible_id: Option<String>,
    pub attendance_1: Option<NaiveDate>,
    pub attendance_2: Option<NaiveDate>,
    pub attendance_3: Option<NaiveDate>,
    pub attendance_4: Option<NaiveDate>,
    pub final_status: Option<FinalStatus>,
    pub email: Option<String>,
    pub contact_email: Option<String>,
}

/// Unvalidated input for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub contract: Option<String>,
    pub dispatch_count: Option<i64>,
    pub last_dispatch: Option<NaiveDate>,
    pub tax_id: Option<String>,
    pub responsible_id: Option<String>,
    pub attendance_1: Option<NaiveDate>,
    pub attendance_2: Option<NaiveDate>,
    pub attendance_3: Option<NaiveDate>,
    pub attendance_4: Option<NaiveDate>,
    pub final_status: Option<String>,
    pub email: Option<String>,
    pub contact_email: Option<String>,
}

impl CustomerDraft {
    /// Validate every field, collecting all failures.
    ///
    /// Text is trimmed; empty optional text becomes absent and an absent
    /// dispatch count becomes 0.
    pub fn validate(self) -> Result<CustomerFields, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = required_text(&mut errors, "name", self.name, NAME_MAX_LEN);
        let phone = required_text(&mut errors, "phone", self.phone, PHONE_MAX_LEN);
        let organization = required_text(
            &mut errors,
            "organization",
            self.organization,
            ORGANIZATION_MAX_LEN,
        );
        let contract = required_text(&mut errors, "contract", self.contract, CONTRACT_MAX_LEN);

        let dispatch_count = match self.dispatch_count {
            None => 0,
            Some(n) if n < 0 => {
                errors.push(ValidationError::field(
                    "dispatch_count",
                    "must not be negative",
                ));
                0
            }
            Some(n) => i32::try_from(n).unwrap_or_else(|_| {
                errors.push(ValidationError::field("dispatch_count", "is too large"));
                0
            }),
        };

        let tax_id = optional_text(&mut errors, "tax_id", self.tax_id, TAX_ID_MAX_LEN);
        let responsible_id = optional_text(
            &mut errors,
            "responsible_id",
            self.responsible_id,
            RESPONSIBLE_ID_MAX_LEN,
        );

        let final_status = match non_empty(self.final_status) {
            None => None,
            Some(raw) => {
                let parsed = FinalStatus::parse(&raw);
                if parsed.is_none() {
                    errors.push(ValidationError::field(
                        "final_status",
                        "must be one of A (active), I (inactive), C (canceled)",
                    ));
                }
                parsed
            }
        };

        let email = optional_email(&mut errors, "email", self.email, EMAIL_MAX_LEN);
        let contact_email = optional_email(
            &mut errors,
            "contact_email",
            self.contact_email,
            CONTACT_EMAIL_MAX_LEN,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CustomerFields {
            name,
            phone,
            organization,
            contract,
            dispatch_count,
            last_dispatch: self.last_dispatch,
            tax_id,
            responsible_id,
            attendance_1: self.attendance_1,
            attendance_2: self.attendance_2,
            attendance_3: self.attendance_3,
            attendance_4: self.attendance_4,
            final_status,
            email,
            contact_email,
        })
    }
}

impl From<CustomerFields> for CustomerDraft {
    fn from(fields: CustomerFields) -> Self {
        Self {
            name: Some(fields.name),
            phone: Some(fields.phone),
            organization: Some(fields.organization),
            contract: Some(fields.contract),
            dispatch_count: Some(i64::from(fields.dispatch_count)),
            last_dispatch: fields.last_dispatch,
            tax_id: fields.tax_id,
            responsible_id: fields.responsible_id,
            attendance_1: fields.attendance_1,
            attendance_2: fields.attendance_2,
            attendance_3: fields.attendance_3,
            attendance_4: fields.attendance_4,
            final_status: fields.final_status.map(|s| s.code().to_string()),
            email: fields.email,
            contact_email: fields.contact_email,
        }
    }
}

/// Row shape of the customer table.
///
/// Column names are those of the existing table; the store selects them
/// in this order.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    pub id: i64,
    #[sqlx(rename = "nome")]
    pub name: String,
    #[sqlx(rename = "celzap")]
    pub phone: String,
    #[sqlx(rename = "empresa")]
    pub organization: String,
    #[sqlx(rename = "contrato")]
    pub contract: String,
    #[sqlx(rename = "disparos")]
    pub dispatch_count: Option<i32>,
    #[sqlx(rename = "ultdisparo")]
    pub last_dispatch: Option<NaiveDate>,
    #[sqlx(rename = "cnpj")]
    pub tax_id: Option<String>,
    #[sqlx(rename = "cpfresp")]
    pub responsible_id: Option<String>,
    #[sqlx(rename = "dtatend1")]
    pub attendance_1: Option<NaiveDate>,
    #[sqlx(rename = "dtatend2")]
    pub attendance_2: Option<NaiveDate>,
    #[sqlx(rename = "dtatend3")]
    pub attendance_3: Option<NaiveDate>,
    #[sqlx(rename = "dtatend4")]
    pub attendance_4: Option<NaiveDate>,
    #[sqlx(rename = "finalstatus")]
    pub final_status: Option<String>,
    pub email: Option<String>,
    #[sqlx(rename = "emailcontato")]
    pub contact_email: Option<String>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = anyhow::Error;

    fn try_from(row: CustomerRow) -> anyhow::Result<Self> {
        let final_status = match row.final_status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => match FinalStatus::from_code(code) {
                Some(status) => Some(status),
                None => bail!("customer {} has unknown final status code '{code}'", row.id),
            },
        };

        Ok(Customer {
            id: row.id,
            fields: CustomerFields {
                name: row.name,
                phone: row.phone,
                organization: row.organization,
                contract: row.contract,
                dispatch_count: row.dispatch_count.unwrap_or(0),
                last_dispatch: row.last_dispatch,
                tax_id: row.tax_id,
                responsible_id: row.responsible_id,
                attendance_1: row.attendance_1,
                attendance_2: row.attendance_2,
                attendance_3: row.attendance_3,
                attendance_4: row.attendance_4,
                final_status,
                email: row.email,
                contact_email: row.contact_email,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> String {
    match non_empty(value) {
        None => {
            errors.push(ValidationError::field(field, "is required"));
            String::new()
        }
        Some(v) => {
            check_length(errors, field, &v, max_len);
            v
        }
    }
}

fn optional_text(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> Option<String> {
    let value = non_empty(value)?;
    check_length(errors, field, &value, max_len);
    Some(value)
}

fn optional_email(
    errors: &mut Vec<ValidationError>,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> Option<String> {
    let value = non_empty(value)?;
    if !is_valid_email(&value) {
        errors.push(ValidationError::field(field, "must be a valid email address"));
    } else {
        check_length(errors, field, &value, max_len);
    }
    Some(value)
}

fn check_length(errors: &mut Vec<ValidationError>, field: &str, value: &str, max_len: usize) {
    if value.chars().count() > max_len {
        errors.push(ValidationError::field(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
}

/// Basic email validation: exactly one `@`, non-empty local part, and a
/// domain containing a dot. No whitespace anywhere.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
