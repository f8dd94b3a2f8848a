mod common;

use std::fs;

use common::{date, dec, june_sample, single};
use invoice_core::{
    config::{Config, ConfigManager},
    core::services::InvoiceService,
    storage::{
        json_backend::{load_transactions_from_path, save_transactions_to_path},
        JsonStore, TransactionStore,
    },
};
use tempfile::TempDir;
use uuid::Uuid;

#[test]
fn json_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let scope = Uuid::new_v4();
    {
        let service = InvoiceService::new(JsonStore::in_base_dir(temp.path()).unwrap());
        service.import_many(june_sample(scope)).unwrap();
    }

    let reopened = InvoiceService::new(JsonStore::in_base_dir(temp.path()).unwrap());
    let invoice = reopened.invoice_for_month(scope, "2025-06").unwrap();
    assert_eq!(invoice.total, dec("183.33"));
    assert!(temp
        .path()
        .join("transactions")
        .join(format!("{}.json", scope))
        .exists());
}

#[test]
fn saved_files_leave_no_temp_behind() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rows.json");
    let rows = june_sample(Uuid::new_v4());
    save_transactions_to_path(&rows, &path).unwrap();
    save_transactions_to_path(&rows, &path).unwrap();

    let names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["rows.json"]);
    assert_eq!(load_transactions_from_path(&path).unwrap(), rows);
}

#[test]
fn stored_rows_use_tagged_kinds_and_string_amounts() {
    let temp = TempDir::new().unwrap();
    let store = JsonStore::in_base_dir(temp.path()).unwrap();
    let scope = Uuid::new_v4();
    store
        .insert(single(scope, "Dinner", "100.50", date(2025, 6, 10)))
        .unwrap();

    let raw = fs::read_to_string(store.scope_path(scope)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let row = &value[0];
    assert_eq!(row["type"], "single");
    assert_eq!(row["amount"], "100.50");
    assert_eq!(row["start_date"], "2025-06-10");
    assert!(row.get("category_id").is_none());
}

#[test]
fn corrupt_scope_file_reports_serde_error() {
    let temp = TempDir::new().unwrap();
    let store = JsonStore::in_base_dir(temp.path()).unwrap();
    let scope = Uuid::new_v4();
    fs::write(store.scope_path(scope), "{ not json").unwrap();
    let err = store.list(scope).unwrap_err();
    assert!(err.to_string().starts_with("Serialization error"));
}

#[test]
fn config_round_trips_through_disk() {
    let temp = TempDir::new().unwrap();
    let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    let config = Config {
        lookback_months: 24,
        currency: "USD".into(),
        locale: "en-US".into(),
        spending_limit: Some(dec("3000")),
        active_scope: None,
    };
    manager.save(&config).unwrap();

    let reopened = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    assert_eq!(reopened.load().unwrap(), config);
    assert!(!temp.path().join("config").join("config.json.tmp").exists());
}
