//! Database models.

mod customer;

pub use customer::{
    CONTACT_EMAIL_MAX_LEN, CONTRACT_MAX_LEN, Customer, CustomerDraft, CustomerFields,
    EMAIL_MAX_LEN, FinalStatus, NAME_MAX_LEN, ORGANIZATION_MAX_LEN, PHONE_MAX_LEN,
    RESPONSIBLE_ID_MAX_LEN, TAX_ID_MAX_LEN,
};
pub(crate) use customer::CustomerRow;
