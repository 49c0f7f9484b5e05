use super::*;
use tempfile::tempdir;

fn record(attribute: &str, timestamp: &str, new_state: &str) -> AuditRecord {
    let (actuator_type, location) = attribute.split_once('_').unwrap();
    AuditRecord {
        thing_name: "MiCasa".to_string(),
        attribute: attribute.to_string(),
        timestamp: timestamp.to_string(),
        actuator_type: actuator_type.to_string(),
        location: location.to_string(),
        new_state: new_state.to_string(),
        previous_state: None,
    }
}

#[test]
fn test_actuator_id_joins_thing_and_attribute() {
    assert_eq!(record("luz_sala", "1", "ON").actuator_id(), "MiCasa_luz_sala");
}

#[tokio::test]
async fn test_put_and_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.db");
    let store = SqliteAuditStore::new(path.to_str().unwrap()).unwrap();

    store.put(&record("luz_sala", "1718000001", "ON")).await.unwrap();
    let mut second = record("luz_sala", "1718000002", "OFF");
    second.previous_state = Some("ON".to_string());
    store.put(&second).await.unwrap();
    store.put(&record("puerta_cocina", "1718000001", "OPEN")).await.unwrap();

    let history = store.history("MiCasa_luz_sala").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].new_state, "ON");
    assert_eq!(history[1], second);
}

#[tokio::test]
async fn test_same_actuator_and_timestamp_replaces() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.db");
    let store = SqliteAuditStore::new(path.to_str().unwrap()).unwrap();

    store.put(&record("luz_sala", "1718000001", "ON")).await.unwrap();
    store.put(&record("luz_sala", "1718000001", "OFF")).await.unwrap();

    let history = store.history("MiCasa_luz_sala").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_state, "OFF");
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.db");

    {
        let store = SqliteAuditStore::new(path.to_str().unwrap()).unwrap();
        store.insert(&record("ventana_sala", "5", "OPEN")).unwrap();
    }

    let store = SqliteAuditStore::new(path.to_str().unwrap()).unwrap();
    assert_eq!(store.history("MiCasa_ventana_sala").unwrap().len(), 1);
}

#[test]
fn test_history_keeps_insertion_order_across_timestamp_widths() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("audit.db");
    let store = SqliteAuditStore::new(path.to_str().unwrap()).unwrap();

    store.insert(&record("luz_sala", "999", "ON")).unwrap();
    store.insert(&record("luz_sala", "1000", "OFF")).unwrap();
    store.insert(&record("luz_sala", "2024-06-10T12:00:00Z", "ON")).unwrap();

    let history = store.history("MiCasa_luz_sala").unwrap();
    let stamps: Vec<&str> = history.iter().map(|r| r.timestamp.as_str()).collect();
    assert_eq!(stamps, vec!["999", "1000", "2024-06-10T12:00:00Z"]);
}
