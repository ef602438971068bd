use filedeck::listing::ListOptions;
use filedeck::session::Session;
use tempfile::tempdir;

// End-to-end walk through the canonical workflow: make a directory, enter
// it, create two files, delete one, list what remains.
#[test]
fn mkdir_cd_touch_rm_ls() {
    let td = tempdir().unwrap();
    let mut session = Session::new(td.path()).unwrap();

    session.create_dirs(".", &["test".into()]).unwrap();
    session.cd("test").unwrap();
    assert!(session.pwd().ends_with("test"));

    session
        .create_files(".", &["a.txt".into(), "b.txt".into()])
        .unwrap();
    session.delete(&["a.txt".into()]).unwrap();

    let folders = session.list_dirs(ListOptions::default()).unwrap();
    let files = session.list_files(ListOptions::default()).unwrap();
    assert!(folders.is_empty());
    assert_eq!(files, vec!["b.txt"]);
}
