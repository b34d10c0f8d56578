//! Field registry.
//!
//! The closed set of customer attributes that queries can search or sort
//! on. Request parameters name fields by string; they resolve to a
//! [`CustomerField`] once per request and nothing downstream looks fields
//! up by name again.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::Customer;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    /// Single-character code from a closed enum.
    Code,
}

/// A customer attribute known to the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Id,
    Name,
    Phone,
    Organization,
    Contract,
    DispatchCount,
    LastDispatch,
    TaxId,
    ResponsibleId,
    Attendance1,
    Attendance2,
    Attendance3,
    Attendance4,
    FinalStatus,
    Email,
    ContactEmail,
}

/// Borrowed value of one field on one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Integer(Option<i64>),
    Date(Option<NaiveDate>),
}

impl CustomerField {
    /// Every field, in export column order.
    pub const ALL: [CustomerField; 16] = [
        CustomerField::Id,
        CustomerField::Name,
        CustomerField::Phone,
        CustomerField::Organization,
        CustomerField::Contract,
        CustomerField::DispatchCount,
        CustomerField::LastDispatch,
        CustomerField::TaxId,
        CustomerField::ResponsibleId,
        CustomerField::Attendance1,
        CustomerField::Attendance2,
        CustomerField::Attendance3,
        CustomerField::Attendance4,
        CustomerField::FinalStatus,
        CustomerField::Email,
        CustomerField::ContactEmail,
    ];

    /// Fields matched by the free-text search term.
    pub const SEARCHABLE: [CustomerField; 8] = [
        CustomerField::Id,
        CustomerField::Name,
        CustomerField::Phone,
        CustomerField::Organization,
        CustomerField::Contract,
        CustomerField::TaxId,
        CustomerField::ResponsibleId,
        CustomerField::Email,
    ];

    /// Public name, used in request parameters and the export header.
    pub fn name(self) -> &'static str {
        match self {
            CustomerField::Id => "id",
            CustomerField::Name => "name",
            CustomerField::Phone => "phone",
            CustomerField::Organization => "organization",
            CustomerField::Contract => "contract",
            CustomerField::DispatchCount => "dispatch_count",
            CustomerField::LastDispatch => "last_dispatch",
            CustomerField::TaxId => "tax_id",
            CustomerField::ResponsibleId => "responsible_id",
            CustomerField::Attendance1 => "attendance_1",
            CustomerField::Attendance2 => "attendance_2",
            CustomerField::Attendance3 => "attendance_3",
            CustomerField::Attendance4 => "attendance_4",
            CustomerField::FinalStatus => "final_status",
            CustomerField::Email => "email",
            CustomerField::ContactEmail => "contact_email",
        }
    }

    /// Column name in the customer table.
    pub fn column(self) -> &'static str {
        match self {
            CustomerField::Id => "id",
            CustomerField::Name => "nome",
            CustomerField::Phone => "celzap",
            CustomerField::Organization => "empresa",
            CustomerField::Contract => "contrato",
            CustomerField::DispatchCount => "disparos",
            CustomerField::LastDispatch => "ultdisparo",
            CustomerField::TaxId => "cnpj",
            CustomerField::ResponsibleId => "cpfresp",
            CustomerField::Attendance1 => "dtatend1",
            CustomerField::Attendance2 => "dtatend2",
            CustomerField::Attendance3 => "dtatend3",
            CustomerField::Attendance4 => "dtatend4",
            CustomerField::FinalStatus => "finalstatus",
            CustomerField::Email => "email",
            CustomerField::ContactEmail => "emailcontato",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CustomerField::Id | CustomerField::DispatchCount => FieldKind::Integer,
            CustomerField::LastDispatch
            | CustomerField::Attendance1
            | CustomerField::Attendance2
            | CustomerField::Attendance3
            | CustomerField::Attendance4 => FieldKind::Date,
            CustomerField::FinalStatus => FieldKind::Code,
            _ => FieldKind::Text,
        }
    }

    pub fn is_searchable(self) -> bool {
        Self::SEARCHABLE.contains(&self)
    }

    /// Resolve a raw field name.
    ///
    /// Accepts the public name or the column name, exactly (after
    /// trimming). Unknown names yield `None`; callers fall back rather
    /// than fail.
    pub fn from_name(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.name() == raw || field.column() == raw)
    }

    /// Value of this field on a record.
    pub fn value(self, customer: &Customer) -> FieldValue<'_> {
        let f = &customer.fields;
        match self {
            CustomerField::Id => FieldValue::Integer(Some(customer.id)),
            CustomerField::Name => FieldValue::Text(Some(f.name.as_str())),
            CustomerField::Phone => FieldValue::Text(Some(f.phone.as_str())),
            CustomerField::Organization => FieldValue::Text(Some(f.organization.as_str())),
            CustomerField::Contract => FieldValue::Text(Some(f.contract.as_str())),
            CustomerField::DispatchCount => FieldValue::Integer(Some(i64::from(f.dispatch_count))),
            CustomerField::LastDispatch => FieldValue::Date(f.last_dispatch),
            CustomerField::TaxId => FieldValue::Text(f.tax_id.as_deref()),
            CustomerField::ResponsibleId => FieldValue::Text(f.responsible_id.as_deref()),
            CustomerField::Attendance1 => FieldValue::Date(f.attendance_1),
            CustomerField::Attendance2 => FieldValue::Date(f.attendance_2),
            CustomerField::Attendance3 => FieldValue::Date(f.attendance_3),
            CustomerField::Attendance4 => FieldValue::Date(f.attendance_4),
            CustomerField::FinalStatus => FieldValue::Text(f.final_status.map(|s| s.code())),
            CustomerField::Email => FieldValue::Text(f.email.as_deref()),
            CustomerField::ContactEmail => FieldValue::Text(f.contact_email.as_deref()),
        }
    }

    /// Textual form of the value, `None` when the field is unset.
    ///
    /// Integers render in decimal and dates as `YYYY-MM-DD`. Search
    /// matches against this text and export writes it.
    pub fn text(self, customer: &Customer) -> Option<Cow<'_, str>> {
        match self.value(customer) {
            FieldValue::Text(text) => text.map(Cow::Borrowed),
            FieldValue::Integer(n) => n.map(|n| Cow::Owned(n.to_string())),
            FieldValue::Date(d) => d.map(|d| Cow::Owned(d.format("%Y-%m-%d").to_string())),
        }
    }

    /// Ascending comparison of two records on this field.
    ///
    /// Absent values sort after present ones, matching PostgreSQL's
    /// default `NULLS LAST` for ascending order.
    pub fn compare(self, a: &Customer, b: &Customer) -> Ordering {
        match (self.value(a), self.value(b)) {
            (FieldValue::Text(x), FieldValue::Text(y)) => nulls_last(x, y),
            (FieldValue::Integer(x), FieldValue::Integer(y)) => nulls_last(x, y),
            (FieldValue::Date(x), FieldValue::Date(y)) => nulls_last(x, y),
            _ => Ordering::Equal,
        }
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{CustomerDraft, FinalStatus};

    fn customer(id: i64, name: &str, tax_id: Option<&str>) -> Customer {
        Customer {
            id,
            fields: CustomerDraft {
                name: Some(name.to_string()),
                phone: Some("555".to_string()),
                organization: Some("Acme".to_string()),
                contract: Some("C1".to_string()),
                tax_id: tax_id.map(str::to_string),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        }
    }

    #[test]
    fn names_and_columns_are_unique() {
        for (i, a) in CustomerField::ALL.iter().enumerate() {
            for b in &CustomerField::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
                assert_ne!(a.column(), b.column());
            }
        }
    }

    #[test]
    fn from_name_accepts_public_and_column_names() {
        assert_eq!(CustomerField::from_name("name"), Some(CustomerField::Name));
        assert_eq!(CustomerField::from_name("nome"), Some(CustomerField::Name));
        assert_eq!(
            CustomerField::from_name(" dispatch_count "),
            Some(CustomerField::DispatchCount)
        );
        assert_eq!(
            CustomerField::from_name("dtatend3"),
            Some(CustomerField::Attendance3)
        );
    }

    #[test]
    fn from_name_rejects_unknown_names() {
        assert_eq!(CustomerField::from_name(""), None);
        assert_eq!(CustomerField::from_name("Name"), None);
        assert_eq!(CustomerField::from_name("id; DROP TABLE clientes"), None);
        assert_eq!(CustomerField::from_name("__class__"), None);
    }

    #[test]
    fn searchable_set_is_the_text_identity_fields() {
        let searchable: Vec<_> = CustomerField::ALL
            .into_iter()
            .filter(|f| f.is_searchable())
            .map(CustomerField::name)
            .collect();
        assert_eq!(
            searchable,
            vec![
                "id",
                "name",
                "phone",
                "organization",
                "contract",
                "tax_id",
                "responsible_id",
                "email"
            ]
        );
        assert!(!CustomerField::ContactEmail.is_searchable());
    }

    #[test]
    fn kinds() {
        assert_eq!(CustomerField::Id.kind(), FieldKind::Integer);
        assert_eq!(CustomerField::Attendance4.kind(), FieldKind::Date);
        assert_eq!(CustomerField::FinalStatus.kind(), FieldKind::Code);
        assert_eq!(CustomerField::Email.kind(), FieldKind::Text);
    }

    #[test]
    fn text_skips_unset_fields() {
        let c = customer(42, "Ana", None);
        assert_eq!(CustomerField::Id.text(&c).as_deref(), Some("42"));
        assert_eq!(CustomerField::Name.text(&c).as_deref(), Some("Ana"));
        assert_eq!(CustomerField::TaxId.text(&c), None);
    }

    #[test]
    fn compare_puts_absent_values_last() {
        let with = customer(1, "A", Some("123"));
        let without = customer(2, "B", None);
        assert_eq!(CustomerField::TaxId.compare(&with, &without), Ordering::Less);
        assert_eq!(
            CustomerField::TaxId.compare(&without, &with),
            Ordering::Greater
        );
        assert_eq!(CustomerField::Id.compare(&with, &without), Ordering::Less);
    }

    #[test]
    fn final_status_value_is_its_code() {
        let mut c = customer(1, "A", None);
        c.fields.final_status = Some(FinalStatus::Canceled);
        assert_eq!(
            CustomerField::FinalStatus.value(&c),
            FieldValue::Text(Some("C"))
        );
    }
}
