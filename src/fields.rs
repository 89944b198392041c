//! Payment field schema and the form record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Helper text shown next to an empty required field.
pub const REQUIRED_FIELD_MESSAGE: &str = "Обязательное поле";

/// One of the eight payment fields, in canonical payload order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    /// Payee name
    Name,
    /// Payee account number
    PersonalAcc,
    /// Payee bank name
    BankName,
    /// Bank identification code
    #[serde(rename = "BIC")]
    Bic,
    /// Correspondent account of the payee bank
    CorrespAcc,
    /// Payee taxpayer identification number
    #[serde(rename = "PayeeINN")]
    PayeeInn,
    /// Payment purpose
    Purpose,
    /// Optional amount
    Sum,
}

impl FieldName {
    /// All fields in payload order.
    pub const ALL: [FieldName; 8] = [
        FieldName::Name,
        FieldName::PersonalAcc,
        FieldName::BankName,
        FieldName::Bic,
        FieldName::CorrespAcc,
        FieldName::PayeeInn,
        FieldName::Purpose,
        FieldName::Sum,
    ];

    /// Key used in the payload and in persisted state.
    pub fn key(self) -> &'static str {
        match self {
            FieldName::Name => "Name",
            FieldName::PersonalAcc => "PersonalAcc",
            FieldName::BankName => "BankName",
            FieldName::Bic => "BIC",
            FieldName::CorrespAcc => "CorrespAcc",
            FieldName::PayeeInn => "PayeeINN",
            FieldName::Purpose => "Purpose",
            FieldName::Sum => "Sum",
        }
    }

    /// Input label shown in the form.
    pub fn label(self) -> &'static str {
        match self {
            FieldName::Name => "ФИО",
            FieldName::PersonalAcc => "Лицевой счет",
            FieldName::BankName => "Банк",
            FieldName::Bic => "БИК",
            FieldName::CorrespAcc => "Корреспондентский счет",
            FieldName::PayeeInn => "ИНН получателя",
            FieldName::Purpose => "Назначение платежа",
            FieldName::Sum => "Сумма, руб. (не обязательно)",
        }
    }

    /// Whether the field must be non-empty for the record to be valid.
    pub fn is_required(self) -> bool {
        self != FieldName::Sum
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown field '{value}', expected one of: {}",
                    FieldName::ALL.map(FieldName::key).join(", ")
                )
            })
    }
}

/// The payment form record.
///
/// Values are held exactly as typed. `sum` is in rubles (display unit).
/// The record is treated as a value: edits produce a new record through
/// [`PaymentFields::with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentFields {
    /// Payee name
    #[serde(rename = "Name")]
    pub name: String,
    /// Payee account number
    #[serde(rename = "PersonalAcc")]
    pub personal_acc: String,
    /// Payee bank name
    #[serde(rename = "BankName")]
    pub bank_name: String,
    /// Bank identification code
    #[serde(rename = "BIC")]
    pub bic: String,
    /// Correspondent account
    #[serde(rename = "CorrespAcc")]
    pub corresp_acc: String,
    /// Payee INN
    #[serde(rename = "PayeeINN")]
    pub payee_inn: String,
    /// Payment purpose
    #[serde(rename = "Purpose")]
    pub purpose: String,
    /// Amount in rubles, empty when not given
    #[serde(rename = "Sum")]
    pub sum: String,
}

impl Default for PaymentFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            personal_acc: String::new(),
            bank_name: "ПАО Сбербанк".to_string(),
            bic: "044525225".to_string(),
            corresp_acc: "30101810400000000225".to_string(),
            payee_inn: String::new(),
            purpose: "Оплата услуг".to_string(),
            sum: String::new(),
        }
    }
}

impl PaymentFields {
    /// Read a field value.
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::PersonalAcc => &self.personal_acc,
            FieldName::BankName => &self.bank_name,
            FieldName::Bic => &self.bic,
            FieldName::CorrespAcc => &self.corresp_acc,
            FieldName::PayeeInn => &self.payee_inn,
            FieldName::Purpose => &self.purpose,
            FieldName::Sum => &self.sum,
        }
    }

    /// Return a copy of the record with one field replaced.
    pub fn with(&self, field: FieldName, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.slot(field) = value.into();
        next
    }

    /// Iterate `(field, value)` pairs in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL.into_iter().map(|field| (field, self.get(field)))
    }

    fn slot(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::Name => &mut self.name,
            FieldName::PersonalAcc => &mut self.personal_acc,
            FieldName::BankName => &mut self.bank_name,
            FieldName::Bic => &mut self.bic,
            FieldName::CorrespAcc => &mut self.corresp_acc,
            FieldName::PayeeInn => &mut self.payee_inn,
            FieldName::Purpose => &mut self.purpose,
            FieldName::Sum => &mut self.sum,
        }
    }
}
