//! Integration tests for rule selection over decoded callbacks.

use callback_relay::config::rules::Rule;
use callback_relay::relay::payload::{self, Callback};
use callback_relay::relay::routing::{select_target, RuleSet};

fn make_rule(url: &str, expression: &str) -> Rule {
    Rule {
        url: url.into(),
        expression: expression.into(),
    }
}

fn decoded(record: &Callback) -> callback_relay::relay::payload::ParameterMap {
    let wire = payload::encode(record).unwrap();
    payload::decode(wire.as_bytes()).unwrap()
}

#[test]
fn precedence_follows_file_order() {
    let rules = RuleSet::compile(
        vec![
            make_rule("http://ios", "channelId == 14"),
            make_rule("http://paid", "status == 1"),
            make_rule("http://any", "true"),
        ],
        "http://default",
    );

    let ios = decoded(&Callback {
        channel_id: 14,
        status: 1,
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &ios), "http://ios");

    let paid = decoded(&Callback {
        channel_id: 3,
        status: 1,
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &paid), "http://paid");

    let other = decoded(&Callback::default());
    assert_eq!(select_target(&rules, &other), "http://any");
}

#[test]
fn broken_rules_are_skipped_not_fatal() {
    let rules = RuleSet::compile(
        vec![
            make_rule("http://syntax", "amount >"),
            make_rule("http://unknown", "noSuchField == 1"),
            make_rule("http://types", "amount == 1 && currency"),
            make_rule("http://ok", "currency == 'CNY'"),
        ],
        "http://default",
    );
    assert_eq!(rules.len(), 4);

    let cny = decoded(&Callback {
        amount: 1.0,
        currency: "CNY".into(),
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &cny), "http://ok");

    let usd = decoded(&Callback {
        amount: 1.0,
        currency: "USD".into(),
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &usd), "http://default");
}

#[test]
fn integer_and_float_fields_compare_numerically() {
    let rules = RuleSet::compile(
        vec![make_rule("http://hit", "qkChannelId == 2 && amount == 2")],
        "http://default",
    );
    let params = decoded(&Callback {
        qk_channel_id: 2,
        amount: 2.0,
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &params), "http://hit");
}

#[test]
fn strings_never_equal_numbers() {
    let rules = RuleSet::compile(
        vec![make_rule("http://hit", "dealAmount == 6")],
        "http://default",
    );
    let params = decoded(&Callback {
        deal_amount: "6".into(),
        ..Callback::default()
    });
    assert_eq!(select_target(&rules, &params), "http://default");
}

#[test]
fn absent_fields_take_zero_values() {
    let rules = RuleSet::compile(
        vec![make_rule("http://zero", "status == 0 && orderNo == ''")],
        "http://default",
    );
    let wire = base64::Engine::encode(&base64::prelude::BASE64_STANDARD, br#"{"amount": 1}"#);
    let params = payload::decode(wire.as_bytes()).unwrap();
    assert_eq!(select_target(&rules, &params), "http://zero");
}
