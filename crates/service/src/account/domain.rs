use serde::{Deserialize, Serialize};

/// Account as seen by callers of the service.
///
/// `id` is empty until the store assigns one. Every field is omitted from the
/// JSON form when empty, and unknown fields are rejected on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Account {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_is_camel_case_and_sparse() {
        let a = Account { account_number: "A1".into(), city: "NYC".into(), ..Default::default() };
        assert_eq!(serde_json::to_value(&a).unwrap(), json!({"accountNumber": "A1", "city": "NYC"}));
    }

    #[test]
    fn unknown_fields_and_wrong_types_are_rejected() {
        assert!(serde_json::from_value::<Account>(json!({"name": "Alice", "balance": 10})).is_err());
        assert!(serde_json::from_value::<Account>(json!({"name": 42})).is_err());
        assert!(serde_json::from_value::<Account>(json!(["name"])).is_err());
    }

    #[test]
    fn all_fields_are_optional() {
        let a: Account = serde_json::from_value(json!({})).unwrap();
        assert_eq!(a, Account::default());
    }
}
