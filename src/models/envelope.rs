use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status the remote API uses to say the caller's token is no longer valid.
pub const AUTH_EXPIRED_STATUS: u16 = 401;

/// The fixed response shape of every remote API call.
///
/// Field names on the wire are capitalized and matched case-sensitively.
/// A missing `Data` key and an explicit `"Data": null` both decode to `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    #[serde(rename = "Data", default)]
    pub data: Option<Value>,
    #[serde(
        rename = "StatusCode",
        default,
        deserialize_with = "deserialize_status_code"
    )]
    pub status_code: u16,
    #[serde(rename = "StatusMessage", default)]
    pub status_message: String,
}

impl Envelope {
    /// The envelope produced for a 401 response, whose body is never read.
    pub fn auth_expired() -> Self {
        Envelope {
            status_code: AUTH_EXPIRED_STATUS,
            ..Default::default()
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        self.status_code == AUTH_EXPIRED_STATUS
    }

    /// Decodes a raw response body.
    ///
    /// An empty body is an empty envelope. Anything else must be a JSON object
    /// whose present fields carry the expected types; there is no partial
    /// extraction.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.is_empty() {
            return Ok(Envelope::default());
        }
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON object envelope, found {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value)
    }
}

/// JSON numbers arrive as floats from some backends, so `200.0` is accepted
/// as long as it is integral and fits an HTTP status.
fn deserialize_status_code<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&raw) {
        return Err(D::Error::custom(format!("invalid StatusCode {}", raw)));
    }
    Ok(raw as u16)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_empty_envelope() {
        let envelope = Envelope::decode(b"").unwrap();
        assert_eq!(envelope, Envelope::default());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn null_and_missing_data_are_the_same() {
        let explicit =
            Envelope::decode(br#"{"Data": null, "StatusCode": 200, "StatusMessage": "ok"}"#)
                .unwrap();
        let missing = Envelope::decode(br#"{"StatusCode": 200, "StatusMessage": "ok"}"#).unwrap();
        assert_eq!(explicit, missing);
        assert!(explicit.data.is_none());
        assert_eq!(explicit.status_code, 200);
    }

    #[test]
    fn decodes_data_and_float_status() {
        let envelope =
            Envelope::decode(br#"{"Data": {"id": 7}, "StatusCode": 200.0, "StatusMessage": "ok"}"#)
                .unwrap();
        assert_eq!(envelope.data, Some(json!({"id": 7})));
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.status_message, "ok");
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let envelope =
            Envelope::decode(br#"{"data": [1], "statusCode": 200, "statusMessage": "ok"}"#)
                .unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.status_code, 0);
    }

    #[test]
    fn rejects_wrong_field_types() {
        assert!(Envelope::decode(br#"{"StatusCode": "200"}"#).is_err());
        assert!(Envelope::decode(br#"{"StatusCode": 200.5}"#).is_err());
        assert!(Envelope::decode(br#"{"StatusMessage": 12}"#).is_err());
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(Envelope::decode(br#"[null, 200, "ok"]"#).is_err());
        assert!(Envelope::decode(b"\"ok\"").is_err());
        assert!(Envelope::decode(b"<html>").is_err());
    }

    #[test]
    fn auth_expired_envelope_carries_only_status() {
        let envelope = Envelope::auth_expired();
        assert!(envelope.is_auth_expired());
        assert!(envelope.data.is_none());
        assert!(envelope.status_message.is_empty());
    }
}
