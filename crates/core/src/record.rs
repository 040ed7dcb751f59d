use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Money;

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Alipay,
    WechatPay,
    Cash,
    Other(String),
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "Credit Card"),
            PaymentMethod::DebitCard => write!(f, "Debit Card"),
            PaymentMethod::Alipay => write!(f, "Alipay"),
            PaymentMethod::WechatPay => write!(f, "WeChat Pay"),
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(s: &str) -> Self {
        match squash(s).as_str() {
            "creditcard" | "credit" => PaymentMethod::CreditCard,
            "debitcard" | "debit" => PaymentMethod::DebitCard,
            "alipay" => PaymentMethod::Alipay,
            "wechatpay" | "wechat" => PaymentMethod::WechatPay,
            "cash" | "cashondelivery" => PaymentMethod::Cash,
            _ => PaymentMethod::Other(s.trim().to_string()),
        }
    }
}

impl PaymentMethod {
    pub const KNOWN: [PaymentMethod; 5] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Alipay,
        PaymentMethod::WechatPay,
        PaymentMethod::Cash,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match squash(s).as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Other(s.trim().to_string()),
        }
    }
}

/// Buyer age bracket. Variant order is the canonical display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgeGroup {
    From18To24,
    From25To34,
    From35To44,
    From45To54,
    Over55,
    Other(String),
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeGroup::From18To24 => write!(f, "18-24"),
            AgeGroup::From25To34 => write!(f, "25-34"),
            AgeGroup::From35To44 => write!(f, "35-44"),
            AgeGroup::From45To54 => write!(f, "45-54"),
            AgeGroup::Over55 => write!(f, "55+"),
            AgeGroup::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AgeGroup {
    fn from(s: &str) -> Self {
        match squash(s).as_str() {
            "18-24" => AgeGroup::From18To24,
            "25-34" => AgeGroup::From25To34,
            "35-44" => AgeGroup::From35To44,
            "45-54" => AgeGroup::From45To54,
            "55+" | "55-" => AgeGroup::Over55,
            _ => AgeGroup::Other(s.trim().to_string()),
        }
    }
}

impl AgeGroup {
    pub const KNOWN: [AgeGroup; 5] = [
        AgeGroup::From18To24,
        AgeGroup::From25To34,
        AgeGroup::From35To44,
        AgeGroup::From45To54,
        AgeGroup::Over55,
    ];
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl From<String> for $ty {
            fn from(s: String) -> Self {
                <$ty>::from(s.as_str())
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> Self {
                v.to_string()
            }
        }
    )*};
}

string_conversions!(PaymentMethod, Gender, AgeGroup);

/// One purchase as supplied by the record source.
///
/// Every attribute is optional so that a malformed row is carried as-is;
/// each aggregation skips the rows lacking the attribute it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub date: Option<NaiveDate>,
    pub buyer_id: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub gender: Option<Gender>,
    pub age_group: Option<AgeGroup>,
    pub amount: Option<Money>,
    pub item_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Date,
    BuyerId,
    Category,
    PaymentMethod,
    Gender,
    AgeGroup,
    Amount,
    ItemCount,
}

impl RecordField {
    pub const ALL: [RecordField; 8] = [
        RecordField::Date,
        RecordField::BuyerId,
        RecordField::Category,
        RecordField::PaymentMethod,
        RecordField::Gender,
        RecordField::AgeGroup,
        RecordField::Amount,
        RecordField::ItemCount,
    ];
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::Date => "date",
            RecordField::BuyerId => "buyerId",
            RecordField::Category => "category",
            RecordField::PaymentMethod => "paymentMethod",
            RecordField::Gender => "gender",
            RecordField::AgeGroup => "ageGroup",
            RecordField::Amount => "amount",
            RecordField::ItemCount => "itemCount",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Negative amount {amount} on record {index}")]
    NegativeAmount { index: usize, amount: Money },
    #[error("Item count must be positive on record {index}")]
    ZeroItemCount { index: usize },
}

impl TransactionRecord {
    pub fn new(
        date: NaiveDate,
        buyer_id: &str,
        category: &str,
        amount: Money,
        item_count: u32,
    ) -> Self {
        TransactionRecord {
            date: Some(date),
            buyer_id: Some(buyer_id.to_string()),
            category: Some(category.to_string()),
            amount: Some(amount),
            item_count: Some(item_count),
            ..Default::default()
        }
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_demographics(mut self, gender: Gender, age_group: AgeGroup) -> Self {
        self.gender = Some(gender);
        self.age_group = Some(age_group);
        self
    }

    pub fn has(&self, field: RecordField) -> bool {
        match field {
            RecordField::Date => self.date.is_some(),
            RecordField::BuyerId => self.buyer_id.is_some(),
            RecordField::Category => self.category.is_some(),
            RecordField::PaymentMethod => self.payment_method.is_some(),
            RecordField::Gender => self.gender.is_some(),
            RecordField::AgeGroup => self.age_group.is_some(),
            RecordField::Amount => self.amount.is_some(),
            RecordField::ItemCount => self.item_count.is_some(),
        }
    }

    pub fn missing_fields(&self) -> Vec<RecordField> {
        RecordField::ALL
            .into_iter()
            .filter(|f| !self.has(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.has(*f))
    }

    /// Checks the value-level invariants of the fields that are present.
    /// `index` is the record's position, reported back in the error.
    pub fn validate(&self, index: usize) -> Result<(), RecordError> {
        if let Some(amount) = self.amount {
            if amount.is_negative() {
                return Err(RecordError::NegativeAmount { index, amount });
            }
        }
        if self.item_count == Some(0) {
            return Err(RecordError::ZeroItemCount { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn payment_method_parsing_is_lenient() {
        assert_eq!(PaymentMethod::from("credit_card"), PaymentMethod::CreditCard);
        assert_eq!(PaymentMethod::from("WeChat Pay"), PaymentMethod::WechatPay);
        assert_eq!(PaymentMethod::from("Crypto"), PaymentMethod::Other("Crypto".into()));
        assert_eq!(PaymentMethod::Other("Zelle".into()).to_string(), "Zelle");
    }

    #[test]
    fn age_group_order_is_canonical() {
        let mut groups = vec![
            AgeGroup::Other("unknown".into()),
            AgeGroup::Over55,
            AgeGroup::From18To24,
            AgeGroup::From35To44,
        ];
        groups.sort();
        assert_eq!(
            groups,
            vec![
                AgeGroup::From18To24,
                AgeGroup::From35To44,
                AgeGroup::Over55,
                AgeGroup::Other("unknown".into())
            ]
        );
        assert_eq!(AgeGroup::from("55+"), AgeGroup::Over55);
    }

    #[test]
    fn deserializes_camel_case_json() {
        let json = r#"{
            "date": "2024-01-05",
            "buyerId": "A",
            "category": "electronics",
            "paymentMethod": "Alipay",
            "gender": "female",
            "ageGroup": "25-34",
            "amount": 100.5,
            "itemCount": 2
        }"#;
        let r: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(r.is_complete());
        assert_eq!(r.date, Some(date(2024, 1, 5)));
        assert_eq!(r.payment_method, Some(PaymentMethod::Alipay));
        assert_eq!(r.gender, Some(Gender::Female));
        assert_eq!(r.age_group, Some(AgeGroup::From25To34));
        assert_eq!(r.amount, Some(Money::from_cents(10050)));
    }

    #[test]
    fn missing_json_fields_stay_missing() {
        let r: TransactionRecord =
            serde_json::from_str(r#"{"buyerId": "B", "amount": 3}"#).unwrap();
        assert!(!r.is_complete());
        assert_eq!(
            r.missing_fields(),
            vec![
                RecordField::Date,
                RecordField::Category,
                RecordField::PaymentMethod,
                RecordField::Gender,
                RecordField::AgeGroup,
                RecordField::ItemCount
            ]
        );
    }

    #[test]
    fn validate_rejects_negative_amount_and_zero_items() {
        let ok = TransactionRecord::new(date(2024, 1, 1), "A", "books", Money::from_major(1), 1);
        assert!(ok.validate(0).is_ok());

        let negative = TransactionRecord {
            amount: Some(Money::from_cents(-100)),
            ..ok.clone()
        };
        assert!(matches!(
            negative.validate(3),
            Err(RecordError::NegativeAmount { index: 3, .. })
        ));

        let empty = TransactionRecord {
            item_count: Some(0),
            ..ok
        };
        assert_eq!(empty.validate(7), Err(RecordError::ZeroItemCount { index: 7 }));
    }

    #[test]
    fn serializes_enums_as_labels() {
        let r = TransactionRecord::new(date(2024, 2, 1), "A", "books", Money::from_major(5), 1)
            .with_payment_method(PaymentMethod::CreditCard)
            .with_demographics(Gender::Male, AgeGroup::Over55);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["paymentMethod"], "Credit Card");
        assert_eq!(v["ageGroup"], "55+");
        assert_eq!(v["buyerId"], "A");
    }
}
