use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use toggle_repository::{FileBackupStorage, RepositoryEvent, Storage};

mod common;
use common::{feature_payload, start_repository, WAIT};

#[test]
fn toggles_survive_restart_without_server() {
    let backup_dir = tempfile::tempdir().unwrap();

    {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/features");
            then.status(200).json_body(feature_payload());
        });

        let storage = Arc::new(FileBackupStorage::new(backup_dir.path(), "foo").unwrap());
        let (repository, events) =
            start_repository(&server.base_url(), Duration::ZERO, storage.clone());
        assert!(matches!(events.recv_timeout(WAIT), Ok(RepositoryEvent::Updated)));
        assert!(storage.path().exists());
        repository.stop().unwrap();
    }

    // The server is gone now, the backup still answers
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/features");
        then.status(503);
    });

    let storage = Arc::new(FileBackupStorage::new(backup_dir.path(), "foo").unwrap());
    assert!(storage.wait_until_ready(WAIT).unwrap());
    let (repository, events) =
        start_repository(&server.base_url(), Duration::ZERO, storage);

    assert!(matches!(events.recv_timeout(WAIT), Ok(RepositoryEvent::Failed(_))));
    let toggle = repository.get_toggle("feature").unwrap().unwrap();
    assert!(toggle.enabled);
    assert_eq!(toggle.strategies[0].name, "default");
}
