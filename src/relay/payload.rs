//! Callback payload decoding.
//!
//! The `data` form field carries a standard base64 encoding of a JSON
//! object. [`decode`] turns it into a [`ParameterMap`] over the fixed
//! callback vocabulary; unknown JSON keys are ignored and absent or
//! `null` keys take the field type's zero value.

use std::collections::HashMap;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PipelineError;
use crate::expr::Value;

/// One typed field value taken from a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Float(f64),
    Int(i32),
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<&ParamValue> for Value {
    fn from(v: &ParamValue) -> Self {
        match v {
            ParamValue::Str(s) => Self::Str(s.clone()),
            ParamValue::Float(f) => Self::Number(*f),
            ParamValue::Int(i) => Self::Number(f64::from(*i)),
        }
    }
}

/// Field name to typed value, built from exactly one verified payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMap {
    values: HashMap<&'static str, ParamValue>,
}

impl ParameterMap {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// The field as an expression value.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::from)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

macro_rules! callback_record {
    ($( $field:ident : $ty:ty => $name:literal ),+ $(,)?) => {
        /// A payment callback record as carried in the `data` field.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct Callback {
            $(
                #[serde(rename = $name, deserialize_with = "nullable")]
                pub $field: $ty,
            )+
        }

        /// Every field name a routing expression may reference.
        pub const FIELD_NAMES: &[&str] = &[$($name),+];

        impl Callback {
            #[must_use]
            pub fn into_params(self) -> ParameterMap {
                let mut values = HashMap::with_capacity(FIELD_NAMES.len());
                $( values.insert($name, ParamValue::from(self.$field)); )+
                ParameterMap { values }
            }
        }
    };
}

callback_record! {
    amount: f64 => "amount",
    game_order: String => "gameOrder",
    order_no: String => "orderNo",
    status: i32 => "status",
    self_define: String => "selfDefine",
    channel_uid: String => "channelUid",
    pay_time: String => "payTime",
    channel: String => "channel",
    channel_id: i32 => "channelId",
    goods_id: String => "goodsId",
    goods_name: String => "goodsName",
    yx_is_in_intro_offer_period: String => "yx_is_in_intro_offer_period",
    yx_is_trial_period: String => "yx_is_trial_period",
    iap_sub_expire_snake: String => "iap_sub_expire",
    iap_sub_snake: String => "iap_sub",
    paytype_lower: String => "paytype",
    yx_sub_type: String => "yx_sub_type",
    deal_amount: String => "dealAmount",
    qk_channel_id: i32 => "qkChannelId",
    quick_channel_id: i32 => "quickChannelId",
    sandbox: String => "sandbox",
    iap_sub: String => "iapSub",
    iap_sub_expire: String => "iapSubExpire",
    currency: String => "currency",
    pay_type: String => "payType",
}

/// Standard alphabet with padding, tolerating non-zero bits in the final
/// symbol the way common callback signers emit them.
const PAYLOAD_ENGINE: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

/// Decode a verified payload into its callback record.
pub fn decode_record(payload: &[u8]) -> Result<Callback, PipelineError> {
    let json = PAYLOAD_ENGINE.decode(payload)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Decode a verified payload into a [`ParameterMap`].
pub fn decode(payload: &[u8]) -> Result<ParameterMap, PipelineError> {
    decode_record(payload).map(Callback::into_params)
}

/// Encode a record into the payload's wire form (JSON, then standard base64).
pub fn encode(record: &Callback) -> Result<String, serde_json::Error> {
    Ok(BASE64_STANDARD.encode(serde_json::to_vec(record)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(json: &str) -> Vec<u8> {
        BASE64_STANDARD.encode(json).into_bytes()
    }

    #[test]
    fn round_trip_preserves_fields() {
        let record = Callback {
            amount: 6.48,
            order_no: "A-1001".into(),
            status: 1,
            self_define: "透传参数".into(),
            channel_id: 42,
            currency: "USD".into(),
            iap_sub: "1".into(),
            iap_sub_snake: "0".into(),
            ..Callback::default()
        };
        let wire = encode(&record).unwrap();
        assert_eq!(decode_record(wire.as_bytes()).unwrap(), record);
    }

    #[test]
    fn absent_fields_take_zero_values() {
        let params = decode(&b64(r#"{"amount": 2}"#)).unwrap();
        assert_eq!(params.len(), FIELD_NAMES.len());
        assert_eq!(params.get("amount"), Some(&ParamValue::Float(2.0)));
        assert_eq!(params.get("status"), Some(&ParamValue::Int(0)));
        assert_eq!(params.get("selfDefine"), Some(&ParamValue::Str(String::new())));
    }

    #[test]
    fn null_fields_take_zero_values() {
        let record = decode_record(&b64(r#"{"orderNo": null, "channelId": null}"#)).unwrap();
        assert_eq!(record, Callback::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let record = decode_record(&b64(r#"{"orderNo": "x", "extra": [1, 2]}"#)).unwrap();
        assert_eq!(record.order_no, "x");
    }

    #[test]
    fn snake_and_camel_variants_are_distinct() {
        let record = decode_record(&b64(r#"{"iap_sub": "a", "iapSub": "b"}"#)).unwrap();
        assert_eq!(record.iap_sub_snake, "a");
        assert_eq!(record.iap_sub, "b");
    }

    #[test]
    fn integer_fields_reject_fractions() {
        let err = decode(&b64(r#"{"status": 1.5}"#)).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn string_fields_reject_numbers() {
        let err = decode(&b64(r#"{"goodsId": 1}"#)).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn bad_base64_is_a_decode_error() {
        let err = decode(b"not base64!").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn non_zero_trailing_bits_are_accepted() {
        // "e30=" is "{}"; "e31=" sets the two unused low bits of the last symbol
        assert_eq!(decode_record(b"e31=").unwrap(), Callback::default());
    }

    #[test]
    fn missing_padding_is_rejected() {
        let err = decode(b"e30").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = decode(&b64("{not json")).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn integer_values_become_numbers() {
        let params = decode(&b64(r#"{"channelId": 7}"#)).unwrap();
        assert_eq!(params.value("channelId"), Some(Value::Number(7.0)));
    }
}
