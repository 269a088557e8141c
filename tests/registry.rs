use std::sync::Arc;

use ratebot::registry::{RegistryError, UserRecord, UserRegistry};

fn record(chat_id: i64, username: Option<&str>, first_name: &str, last_name: Option<&str>) -> UserRecord {
    UserRecord {
        chat_id,
        username: username.map(String::from),
        first_name: first_name.to_string(),
        last_name: last_name.map(String::from),
    }
}

#[tokio::test]
async fn upsert_overwrites_without_merging() {
    let dir = tempfile::tempdir().unwrap();
    let registry = UserRegistry::open(dir.path().join("users.json"));

    registry
        .upsert("42", record(42, Some("arthur"), "Arthur", Some("Dent")))
        .await
        .unwrap();
    registry.upsert("7", record(7, None, "Ford", None)).await.unwrap();
    registry
        .upsert("42", record(42, None, "Arthur", None))
        .await
        .unwrap();

    let all = registry.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    let (_, arthur) = all.iter().find(|(id, _)| id == "42").unwrap();
    assert_eq!(arthur, &record(42, None, "Arthur", None));
}

#[tokio::test]
async fn persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    UserRegistry::open(&path)
        .upsert("1", record(1, Some("a"), "A", None))
        .await
        .unwrap();

    let all = UserRegistry::open(&path).list_all().await.unwrap();
    assert_eq!(all, vec![("1".to_string(), record(1, Some("a"), "A", None))]);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["1"]["chat_id"], 1);
    assert_eq!(raw["1"]["username"], "a");
    assert!(raw["1"]["last_name"].is_null());
}

#[tokio::test]
async fn corrupt_store_is_quarantined_and_upsert_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, "{\"1\": {\"chat_id\": 1, trunc").unwrap();

    let registry = UserRegistry::open(&path);
    assert!(matches!(
        registry.list_all().await,
        Err(RegistryError::Corrupt { .. })
    ));

    registry.upsert("42", record(42, None, "Zaphod", None)).await.unwrap();

    let all = registry.list_all().await.unwrap();
    assert!(all.iter().any(|(id, _)| id == "42"));

    let quarantined: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("users.json.corrupt-"))
        .collect();
    assert_eq!(quarantined.len(), 1);
    let kept = std::fs::read_to_string(dir.path().join(&quarantined[0])).unwrap();
    assert!(kept.contains("trunc"));
}

#[tokio::test]
async fn non_utf8_store_is_treated_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let registry = UserRegistry::open(&path);
    registry.upsert("5", record(5, None, "Trillian", None)).await.unwrap();
    assert_eq!(registry.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_upserts_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(UserRegistry::open(dir.path().join("users.json")));

    let mut handles = Vec::new();
    for i in 0..20i64 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry
                .upsert(&i.to_string(), record(i, None, "user", None))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.list_all().await.unwrap().len(), 20);
}
