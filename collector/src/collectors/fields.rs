//! Numeric coercion of upstream JSON fields. Both APIs send numbers as
//! JSON numbers or as strings, depending on the endpoint.

use crate::error::GatewayError;
use serde_json::Value;

fn field<'a>(service: &'static str, object: &'a Value, name: &str) -> Result<&'a Value, GatewayError> {
    object.get(name).ok_or_else(|| GatewayError::MissingField {
        service,
        field: name.to_string(),
    })
}

fn not_numeric(service: &'static str, name: &str, value: &Value) -> GatewayError {
    GatewayError::NotNumeric {
        service,
        field: name.to_string(),
        value: value.to_string(),
    }
}

pub(crate) fn integer_field(service: &'static str, object: &Value, name: &str) -> Result<u64, GatewayError> {
    let value = field(service, object, name)?;
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| not_numeric(service, name, value))
}

pub(crate) fn float_field(service: &'static str, object: &Value, name: &str) -> Result<f64, GatewayError> {
    let value = field(service, object, name)?;
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| not_numeric(service, name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let object = json!({ "a": 3, "b": "4", "c": 0.15, "d": "0.50" });
        assert_eq!(integer_field("test", &object, "a").unwrap(), 3);
        assert_eq!(integer_field("test", &object, "b").unwrap(), 4);
        assert_eq!(float_field("test", &object, "c").unwrap(), 0.15);
        assert_eq!(float_field("test", &object, "d").unwrap(), 0.5);
    }

    #[test]
    fn missing_and_non_numeric_fields_are_errors() {
        let object = json!({ "a": "many", "b": null, "c": 1.5 });
        assert!(matches!(
            integer_field("test", &object, "missing"),
            Err(GatewayError::MissingField { field, .. }) if field == "missing"
        ));
        assert!(matches!(
            integer_field("test", &object, "a"),
            Err(GatewayError::NotNumeric { .. })
        ));
        assert!(matches!(
            float_field("test", &object, "b"),
            Err(GatewayError::NotNumeric { .. })
        ));
        assert!(matches!(
            integer_field("test", &object, "c"),
            Err(GatewayError::NotNumeric { .. })
        ));
    }
}
