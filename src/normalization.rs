use rust_decimal::Decimal;
use serde_json::Value;

use crate::shared_types::{first_text, RawMarket, NormalizedOutcome};

pub const CONDITION_ID_KEYS: [&str; 2] = ["conditionId", "condition_id"];

/// The listing API encodes list-like fields in several ways: as a JSON string
/// holding a list, as a native list, or as a mapping whose values are the
/// items. All of them decode to the same ordered item sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedList {
    Encoded(String),
    List(Vec<Value>),
    Mapping(serde_json::Map<String, Value>),
    Other,
}

impl ShapedList {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => ShapedList::Encoded(s.clone()),
            Some(Value::Array(items)) => ShapedList::List(items.clone()),
            Some(Value::Object(map)) => ShapedList::Mapping(map.clone()),
            _ => ShapedList::Other,
        }
    }

    /// Items in source order. A string that does not parse as JSON, or parses
    /// to a scalar, decodes to nothing.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            ShapedList::Encoded(s) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Array(items)) => items,
                Ok(Value::Object(map)) => map.into_iter().map(|(_, v)| v).collect(),
                _ => Vec::new(),
            },
            ShapedList::List(items) => items,
            ShapedList::Mapping(map) => map.into_iter().map(|(_, v)| v).collect(),
            ShapedList::Other => Vec::new(),
        }
    }
}

pub fn condition_id(market: &RawMarket) -> Option<String> {
    first_text(market, &CONDITION_ID_KEYS)
}

/// Outcome names in source order. Object entries are named by `name`, then
/// `title`, then "Unknown".
pub fn outcome_names(market: &RawMarket) -> Vec<String> {
    ShapedList::from_value(market.get("outcomes"))
        .into_items()
        .iter()
        .filter_map(outcome_label)
        .collect()
}

fn outcome_label(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(fields) => {
            let name = ["name", "title"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .unwrap_or("Unknown");
            Some(name.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) => None,
    }
}

/// Baseline prices in source order, one slot per item; unparseable items
/// keep their slot as `None` so positions stay aligned with outcome names.
pub fn outcome_prices(market: &RawMarket) -> Vec<Option<Decimal>> {
    ShapedList::from_value(market.get("outcomePrices"))
        .into_items()
        .iter()
        .map(parse_price)
        .collect()
}

pub fn parse_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Pairs outcome names with baseline prices by position. Returns nothing for a
/// market without a condition id, since such a market cannot be priced.
pub fn normalize(market: &RawMarket) -> Vec<NormalizedOutcome> {
    if condition_id(market).is_none() {
        return Vec::new();
    }

    let prices = outcome_prices(market);
    outcome_names(market)
        .into_iter()
        .enumerate()
        .map(|(i, name)| NormalizedOutcome {
            name,
            baseline_price: prices.get(i).copied().flatten(),
            token_id: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn market(value: Value) -> RawMarket {
        value.as_object().cloned().unwrap()
    }

    fn pairs(outcomes: &[NormalizedOutcome]) -> Vec<(String, Option<Decimal>)> {
        outcomes
            .iter()
            .map(|o| (o.name.clone(), o.baseline_price))
            .collect()
    }

    #[test]
    fn test_encoded_and_native_forms_agree() {
        let encoded = market(json!({
            "conditionId": "0xabc",
            "outcomes": "[\"Yes\",\"No\"]",
            "outcomePrices": "[\"0.62\",\"0.38\"]"
        }));
        let native = market(json!({
            "conditionId": "0xabc",
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["0.62", "0.38"]
        }));
        assert_eq!(normalize(&encoded), normalize(&native));
        assert_eq!(
            pairs(&normalize(&encoded)),
            vec![
                ("Yes".to_string(), Some(dec!(0.62))),
                ("No".to_string(), Some(dec!(0.38)))
            ]
        );
    }

    #[test]
    fn test_missing_price_slot_is_none() {
        let m = market(json!({
            "condition_id": "0x1",
            "outcomes": ["A", "B", "C"],
            "outcomePrices": [0.5, "0.25"]
        }));
        assert_eq!(
            pairs(&normalize(&m)),
            vec![
                ("A".to_string(), Some(dec!(0.5))),
                ("B".to_string(), Some(dec!(0.25))),
                ("C".to_string(), None)
            ]
        );
    }

    #[test]
    fn test_unparseable_price_is_none() {
        let m = market(json!({
            "conditionId": "0x1",
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["n/a", true]
        }));
        assert!(normalize(&m).iter().all(|o| o.baseline_price.is_none()));
    }

    #[test]
    fn test_object_outcomes_fall_back_to_title_then_unknown() {
        let m = market(json!({
            "conditionId": "0x1",
            "outcomes": [{"name": "Up"}, {"title": "Down"}, {"id": 3}]
        }));
        let names: Vec<String> = normalize(&m).into_iter().map(|o| o.name).collect();
        assert_eq!(names, ["Up", "Down", "Unknown"]);
    }

    #[test]
    fn test_mapping_shapes_use_values_in_order() {
        let m = market(json!({
            "conditionId": "0x1",
            "outcomes": {"first": "Yes", "second": "No"},
            "outcomePrices": {"b": "0.7", "a": "0.3"}
        }));
        assert_eq!(
            pairs(&normalize(&m)),
            vec![
                ("Yes".to_string(), Some(dec!(0.7))),
                ("No".to_string(), Some(dec!(0.3)))
            ]
        );
    }

    #[test]
    fn test_malformed_encoded_field_is_empty() {
        let m = market(json!({
            "conditionId": "0x1",
            "outcomes": "[\"Yes\", ",
            "outcomePrices": "[\"0.5\"]"
        }));
        assert!(normalize(&m).is_empty());
    }

    #[test]
    fn test_missing_condition_id_yields_no_outcomes() {
        let m = market(json!({
            "outcomes": ["Yes", "No"],
            "outcomePrices": ["0.5", "0.5"],
            "conditionId": ""
        }));
        assert_eq!(condition_id(&m), None);
        assert!(normalize(&m).is_empty());
    }

    #[test]
    fn test_parse_decimal_accepts_scientific() {
        assert_eq!(parse_decimal(" 0.125 "), Some(dec!(0.125)));
        assert_eq!(parse_decimal("1e-3"), Some(dec!(0.001)));
        assert_eq!(parse_decimal("NaN"), None);
    }
}
