use filedeck::listing::ListOptions;
use filedeck::session::Session;
use filedeck::OpError;
use tempfile::tempdir;

fn seeded_session() -> (tempfile::TempDir, Session) {
    let td = tempdir().unwrap();
    std::fs::write(td.path().join("foo"), b"").unwrap();
    std::fs::write(td.path().join("foobar"), b"").unwrap();
    std::fs::write(td.path().join("notes.txt"), b"").unwrap();
    std::fs::write(td.path().join(".env"), b"").unwrap();
    std::fs::create_dir(td.path().join("foodir")).unwrap();
    let session = Session::new(td.path()).unwrap();
    (td, session)
}

// The filter is a full match, never a substring search.
#[test]
fn exact_pattern_does_not_match_longer_names() {
    let (_td, session) = seeded_session();
    let found = session.find("foo", ListOptions::default()).unwrap();
    assert_eq!(found, vec!["foo"]);
}

#[test]
fn wildcard_pattern_matches_files_then_dirs() {
    let (_td, session) = seeded_session();
    let found = session.find("foo.*", ListOptions::default()).unwrap();
    assert_eq!(found, vec!["foo", "foobar", "foodir"]);
}

#[cfg(unix)]
#[test]
fn hidden_entries_need_the_flag() {
    let (_td, session) = seeded_session();
    assert!(session
        .find("\\.env", ListOptions::default())
        .unwrap()
        .is_empty());
    assert_eq!(
        session
            .find("\\.env", ListOptions { show_hidden: true })
            .unwrap(),
        vec![".env"]
    );
}

#[test]
fn invalid_pattern_is_rejected_up_front() {
    let (_td, session) = seeded_session();
    assert_eq!(
        session.find("*oops", ListOptions::default()),
        Err(OpError::IllegalName)
    );
}

#[test]
fn listings_are_lexicographic() {
    let (_td, session) = seeded_session();
    assert_eq!(
        session.list_files(ListOptions::default()).unwrap(),
        vec!["foo", "foobar", "notes.txt"]
    );
    assert_eq!(
        session.list_dirs(ListOptions::default()).unwrap(),
        vec!["foodir"]
    );
}
