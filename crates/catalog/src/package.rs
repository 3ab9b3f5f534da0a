use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use summit_core::{format_currency, Amount, Entity, ValueObject};

/// Package identifier as stored in the catalog (e.g. `"gold"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for PackageId {}

impl core::fmt::Display for PackageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Raw catalog row exactly as the package store returns it.
///
/// Loosely typed on purpose: shape checks happen once, in [`Package::try_from`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRow {
    pub id: String,
    pub name: String,
    pub price: JsonValue,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub benefits: Option<JsonValue>,
    #[serde(default)]
    pub slots: Option<i64>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub reservation_fee: Option<JsonValue>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A catalog row that failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("package row '{id}' rejected: {reason}")]
pub struct RowRejected {
    pub id: String,
    pub reason: String,
}

impl RowRejected {
    fn new(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read-only sponsorship package, as shown to sponsors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    /// Display price, e.g. `"KES 1,500,000"`.
    pub price: String,
    pub amount: Amount,
    pub currency: String,
    pub description: String,
    pub benefits: Vec<String>,
    /// `None` means unlimited.
    pub slots: Option<u32>,
    pub featured: bool,
    pub reservation_fee: Option<Amount>,
}

impl Entity for Package {
    type Id = PackageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Package {
    pub fn has_benefit(&self, label: &str) -> bool {
        self.benefits.iter().any(|b| b == label)
    }

    pub fn slots_label(&self) -> String {
        match self.slots {
            None => "Unlimited".to_string(),
            Some(1) => "1 slot".to_string(),
            Some(n) => format!("{n} slots"),
        }
    }
}

impl TryFrom<PackageRow> for Package {
    type Error = RowRejected;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        if row.id.trim().is_empty() {
            return Err(RowRejected::new(&row.id, "id cannot be empty"));
        }

        let amount = parse_amount(&row.id, "price", &row.price)?;
        let reservation_fee = match row.reservation_fee {
            None | Some(JsonValue::Null) => None,
            Some(ref v) => Some(parse_amount(&row.id, "reservation_fee", v)?),
        };
        let benefits = parse_benefits(&row.id, row.benefits)?;
        let slots = match row.slots {
            None => None,
            Some(n) => Some(
                u32::try_from(n)
                    .map_err(|_| RowRejected::new(&row.id, format!("slots out of range: {n}")))?,
            ),
        };

        Ok(Self {
            price: format_currency(amount, &row.currency),
            id: PackageId::new(row.id),
            name: row.name,
            amount,
            currency: row.currency,
            description: row.description.unwrap_or_default(),
            benefits,
            slots,
            featured: row.featured.unwrap_or(false),
            reservation_fee,
        })
    }
}

fn parse_amount(id: &str, field: &str, value: &JsonValue) -> Result<Amount, RowRejected> {
    let parsed = match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("{field} is not representable"))
            .and_then(|f| Amount::new(f).map_err(|e| e.to_string())),
        JsonValue::String(s) => s.parse::<Amount>().map_err(|e| e.to_string()),
        other => Err(format!("{field} must be numeric, got {other}")),
    };
    parsed.map_err(|reason| RowRejected::new(id, reason))
}

fn parse_benefits(id: &str, value: Option<JsonValue>) -> Result<Vec<String>, RowRejected> {
    match value {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                JsonValue::String(s) => Ok(s),
                other => Err(RowRejected::new(
                    id,
                    format!("benefits[{idx}] must be a string, got {other}"),
                )),
            })
            .collect(),
        Some(other) => Err(RowRejected::new(
            id,
            format!("benefits must be a list of strings, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str) -> PackageRow {
        PackageRow {
            id: id.to_string(),
            name: "Gold".to_string(),
            price: json!(1500000),
            currency: "KES".to_string(),
            description: Some("Premium visibility".to_string()),
            benefits: Some(json!(["Booth", "Logo on banner"])),
            slots: Some(3),
            featured: Some(true),
            reservation_fee: Some(json!(50000)),
            active: true,
        }
    }

    #[test]
    fn converts_row_and_formats_price() {
        let pkg = Package::try_from(row("gold")).unwrap();
        assert_eq!(pkg.id, PackageId::from("gold"));
        assert_eq!(pkg.price, "KES 1,500,000");
        assert_eq!(pkg.amount, Amount::from(1_500_000));
        assert_eq!(pkg.benefits, vec!["Booth", "Logo on banner"]);
        assert_eq!(pkg.slots, Some(3));
        assert!(pkg.featured);
        assert_eq!(pkg.reservation_fee, Some(Amount::from(50_000)));
    }

    #[test]
    fn numeric_string_price_is_accepted() {
        let mut r = row("silver");
        r.price = json!("1000.5");
        r.currency = "USD".to_string();
        let pkg = Package::try_from(r).unwrap();
        assert_eq!(pkg.price, "USD 1,000.5");
    }

    #[test]
    fn missing_benefits_become_empty() {
        let mut r = row("bronze");
        r.benefits = None;
        assert!(Package::try_from(r.clone()).unwrap().benefits.is_empty());
        r.benefits = Some(JsonValue::Null);
        assert!(Package::try_from(r).unwrap().benefits.is_empty());
    }

    #[test]
    fn non_list_benefits_reject_the_row() {
        let mut r = row("bronze");
        r.benefits = Some(json!("Booth, Logo"));
        let err = Package::try_from(r).unwrap_err();
        assert_eq!(err.id, "bronze");
        assert!(err.reason.contains("list of strings"));
    }

    #[test]
    fn non_string_benefit_rejects_the_row() {
        let mut r = row("bronze");
        r.benefits = Some(json!(["Booth", 3]));
        let err = Package::try_from(r).unwrap_err();
        assert!(err.reason.contains("benefits[1]"));
    }

    #[test]
    fn non_numeric_price_rejects_the_row() {
        let mut r = row("gold");
        r.price = json!("call us");
        assert!(Package::try_from(r).is_err());
        let mut r = row("gold");
        r.price = json!(true);
        assert!(Package::try_from(r).is_err());
    }

    #[test]
    fn negative_slots_reject_the_row() {
        let mut r = row("gold");
        r.slots = Some(-1);
        assert!(Package::try_from(r).is_err());
    }

    #[test]
    fn null_slots_mean_unlimited() {
        let mut r = row("gold");
        r.slots = None;
        let pkg = Package::try_from(r).unwrap();
        assert_eq!(pkg.slots_label(), "Unlimited");
    }

    #[test]
    fn serializes_reservation_fee_in_camel_case() {
        let pkg = Package::try_from(row("gold")).unwrap();
        let value = serde_json::to_value(&pkg).unwrap();
        assert_eq!(value["reservationFee"], json!(50000.0));
        assert!(value.get("reservation_fee").is_none());
        assert_eq!(value["price"], json!("KES 1,500,000"));
    }

    #[test]
    fn row_deserializes_with_defaults() {
        let r: PackageRow = serde_json::from_value(json!({
            "id": "gold",
            "name": "Gold",
            "price": "2000",
            "currency": "USD"
        }))
        .unwrap();
        assert!(r.active);
        assert!(r.benefits.is_none());
        assert!(r.reservation_fee.is_none());
    }
}
