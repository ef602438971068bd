use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use filedeck::lock::LockRegistry;
use filedeck::path::CanonPath;
use filedeck::session::Session;
use filedeck::OpError;
use tempfile::tempdir;

/// Hold `path` on a helper thread until the returned sender is dropped.
fn hold_elsewhere(registry: Arc<LockRegistry>, path: CanonPath) -> (mpsc::Sender<()>, thread::JoinHandle<()>) {
    let (tx_release, rx_release) = mpsc::channel::<()>();
    let (tx_ready, rx_ready) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        registry.lock(std::slice::from_ref(&path));
        tx_ready.send(()).unwrap();
        // Block until the main thread drops its sender.
        let _ = rx_release.recv();
        registry.unlock(std::slice::from_ref(&path));
    });
    rx_ready.recv().unwrap();
    (tx_release, handle)
}

// create must refuse with EntityIsLocked before any name in the batch is
// created when any target is held by another context.
#[test]
fn create_refuses_locked_target_without_mutation() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();
    let target = CanonPath::resolve(td.path()).join("claimed.txt");

    let (release, handle) = hold_elsewhere(Arc::clone(session.registry()), target);

    let res = session.create_files(".", &["fresh.txt".into(), "claimed.txt".into()]);
    assert_eq!(res, Err(OpError::EntityIsLocked));
    assert!(
        !td.path().join("fresh.txt").exists(),
        "locked check precedes every creation in the batch"
    );

    drop(release);
    handle.join().unwrap();
}

#[test]
fn properties_of_locked_entity_refused() {
    let td = tempdir().unwrap();
    std::fs::write(td.path().join("busy.txt"), b"x").unwrap();
    let session = Session::new(td.path()).unwrap();
    let target = CanonPath::resolve(td.path()).join("busy.txt");

    let (release, handle) = hold_elsewhere(Arc::clone(session.registry()), target);
    assert!(matches!(
        session.properties("busy.txt"),
        Err(OpError::EntityIsLocked)
    ));
    drop(release);
    handle.join().unwrap();

    // Released: the same call now succeeds.
    assert!(session.properties("busy.txt").is_ok());
}

// Sessions sharing a registry serialize on shared paths; a session's own
// holds never block itself (reentrancy is per execution context).
#[test]
fn shared_registry_across_sessions() {
    let td = tempdir().unwrap();
    let registry = Arc::new(LockRegistry::new());
    let a = Session::with_registry(td.path(), Arc::clone(&registry), None).unwrap();
    let _b = Session::with_registry(td.path(), Arc::clone(&registry), None).unwrap();

    let target = CanonPath::resolve(td.path()).join("shared.txt");
    let (release, handle) = hold_elsewhere(Arc::clone(&registry), target);

    assert_eq!(
        a.create_files(".", &["shared.txt".into()]),
        Err(OpError::EntityIsLocked)
    );

    drop(release);
    handle.join().unwrap();
    assert_eq!(a.create_files(".", &["shared.txt".into()]), Ok(()));
}
