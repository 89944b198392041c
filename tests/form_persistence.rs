use std::collections::BTreeSet;

use payqr::{FieldName, FormStore, JsonFileStore, PaymentFields, PaymentForm, build_payload};
use serde_json::Value;

const EXPECTED_PAYLOAD: &str = "ST00012|Name=Иванов Иван|PersonalAcc=40817810099910004312|BankName=ПАО Сбербанк|BIC=044525225|CorrespAcc=30101810400000000225|PayeeINN=7707083893|Purpose=Оплата услуг|Sum=15000";

fn sample_fields() -> PaymentFields {
    PaymentFields {
        name: "Иванов Иван".into(),
        personal_acc: "40817810099910004312".into(),
        bank_name: "ПАО Сбербанк".into(),
        bic: "044525225".into(),
        corresp_acc: "30101810400000000225".into(),
        payee_inn: "7707083893".into(),
        purpose: "Оплата услуг".into(),
        sum: "150.00".into(),
    }
}

#[test]
fn edits_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("form.json");

    let mut form = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    assert_eq!(form.fields(), &PaymentFields::default());
    for (field, value) in sample_fields().iter() {
        form.edit(field, value).unwrap();
    }
    assert_eq!(form.outcome().payload.as_str(), EXPECTED_PAYLOAD);

    let reopened = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    let expected = sample_fields().with(FieldName::Sum, "150");
    assert_eq!(reopened.fields(), &expected);
    assert!(reopened.outcome().is_valid());
    assert_eq!(reopened.outcome().payload.as_str(), EXPECTED_PAYLOAD);
}

#[test]
fn store_load_store_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("form.json"), "qrForm");

    for sum in [
        "150.00",
        "0,5",
        "1.005",
        "",
        "не число",
        "1000000000000000000000000000",
    ] {
        let fields = sample_fields().with(FieldName::Sum, sum);
        store.save(&fields).unwrap();
        let first = std::fs::read(store.path()).unwrap();

        let loaded = store.load().unwrap().expect("stored record");
        store.save(&loaded).unwrap();
        let second = std::fs::read(store.path()).unwrap();

        assert_eq!(first, second, "sum {sum:?}");
        assert_eq!(store.load().unwrap(), Some(loaded));
    }
}

#[test]
fn persisted_record_uses_payload_keys_and_kopecks() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("form.json"), "qrForm");
    store.save(&sample_fields()).unwrap();

    let raw: Value = serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
    let record = raw["qrForm"].as_object().expect("record object");
    let keys: BTreeSet<_> = record.keys().map(String::as_str).collect();
    let expected: BTreeSet<_> = FieldName::ALL.into_iter().map(FieldName::key).collect();
    assert_eq!(keys, expected);
    assert_eq!(record["Sum"], "15000");
}

#[test]
fn oversized_sum_is_kept_verbatim() {
    let huge = "1000000000000000000000000000";
    let outcome = build_payload(&sample_fields().with(FieldName::Sum, huge));
    assert!(outcome.is_valid());
    assert!(outcome.payload.as_str().ends_with(&format!("|Sum={huge}")));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form.json");
    let mut form = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    form.edit(FieldName::Sum, huge).unwrap();

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["qrForm"]["Sum"], huge);

    let reopened = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    assert_eq!(reopened.outcome().payload, outcome.payload);
}

#[test]
fn reset_clears_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form.json");

    let mut form = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    form.replace(sample_fields()).unwrap();
    form.reset().unwrap();

    let reopened = PaymentForm::open(JsonFileStore::new(&path, "qrForm")).unwrap();
    assert_eq!(reopened.fields(), &PaymentFields::default());
}

#[test]
fn validity_depends_only_on_required_fields() {
    let required: Vec<FieldName> = FieldName::ALL
        .into_iter()
        .filter(|f| f.is_required())
        .collect();
    assert_eq!(required.len(), 7);

    for mask in 0u32..(1 << required.len()) {
        for sum in ["", "12.5"] {
            let mut fields = sample_fields().with(FieldName::Sum, sum);
            let mut emptied = BTreeSet::new();
            for (bit, field) in required.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    let blank = if bit % 2 == 0 { "" } else { "  " };
                    fields = fields.with(*field, blank);
                    emptied.insert(*field);
                }
            }

            let outcome = build_payload(&fields);
            assert_eq!(outcome.is_valid(), mask == 0);
            assert_eq!(outcome.errors, emptied);

            let text = outcome.payload.as_str();
            assert!(text.starts_with("ST00012|"));
            let segments = outcome.payload.segments().count();
            assert_eq!(segments, if sum.is_empty() { 7 } else { 8 });
            assert!(outcome.payload.segments().all(|(k, _)| !k.is_empty()));
        }
    }
}
