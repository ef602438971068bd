use filedeck::session::Session;
use filedeck::OpError;
use tempfile::tempdir;

// A failed unit reports first (in submission order), but sibling units are
// never cancelled: their copies land on disk regardless.
#[test]
fn first_error_wins_and_siblings_complete() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();

    session
        .create_files(".", &["a.txt".into(), "c.txt".into(), "d.txt".into()])
        .unwrap();
    session.create_dirs(".", &["out".into()]).unwrap();

    // "missing" sits between real sources in submission order.
    let res = session.copy(
        &["a.txt".into(), "missing".into(), "c.txt".into(), "d.txt".into()],
        "out",
    );
    assert_eq!(res, Err(OpError::EntityNotFound));

    assert!(td.path().join("out/a.txt").exists());
    assert!(td.path().join("out/c.txt").exists(), "siblings keep running");
    assert!(td.path().join("out/d.txt").exists(), "siblings keep running");
}

#[test]
fn deferred_wait_blocks_until_all_units_finish() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();

    let names: Vec<String> = (0..16).map(|i| format!("f{i:02}.dat")).collect();
    session.create_files(".", &names).unwrap();
    session.create_dirs(".", &["out".into()]).unwrap();

    let deferred = session.copy_async(&names, "out").unwrap();
    assert_eq!(deferred.wait(), Ok(()));
    for name in &names {
        assert!(td.path().join("out").join(name).exists());
    }
}

#[test]
fn slow_copy_variant_matches_async_result() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();

    session
        .create_files(".", &["x.txt".into(), "y.txt".into()])
        .unwrap();
    session.create_dirs(".", &["out".into()]).unwrap();

    session
        .copy_sync(&["x.txt".into(), "y.txt".into()], "out")
        .unwrap();
    assert!(td.path().join("out/x.txt").exists());
    assert!(td.path().join("out/y.txt").exists());
}

// slowcp is fail-fast on the calling thread: nothing after the failing
// element runs.
#[test]
fn slow_copy_is_fail_fast() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();

    session.create_files(".", &["x.txt".into()]).unwrap();
    session.create_dirs(".", &["out".into()]).unwrap();

    let res = session.copy_sync(&["ghost".into(), "x.txt".into()], "out");
    assert_eq!(res, Err(OpError::EntityNotFound));
    assert!(!td.path().join("out/x.txt").exists());
}

#[test]
fn drained_session_rejects_new_batches() {
    let td = tempdir().unwrap();
    let session = Session::new(td.path()).unwrap();
    session.create_files(".", &["a.txt".into()]).unwrap();
    session.create_dirs(".", &["out".into()]).unwrap();

    session.drain();
    assert!(session.copy_async(&["a.txt".into()], "out").is_err());
}
