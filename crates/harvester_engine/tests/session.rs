use std::fs;

use harvester_engine::{load_session, save_session, CookieRecord, PersistError, SessionError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn missing_session_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let cookies = load_session(&temp.path().join("cookies.json")).unwrap();
    assert!(cookies.is_empty());
}

#[test]
fn browser_cookie_dump_is_read_and_written_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.json");
    fs::write(
        &path,
        r#"[
  {
    "name": "_ga",
    "value": "GA1.1.42",
    "domain": ".infocasas.com.bo",
    "path": "/",
    "expires": 1767225600.5,
    "size": 12,
    "httpOnly": false,
    "secure": true,
    "session": false,
    "sameSite": "Lax"
  },
  { "name": "sid", "value": "x", "domain": "www.infocasas.com.bo" }
]"#,
    )
    .unwrap();

    let cookies = load_session(&path).unwrap();
    assert_eq!(cookies.len(), 2);
    assert_eq!(cookies[0].host(), "infocasas.com.bo");
    assert!(cookies[0].secure);
    assert_eq!(cookies[0].extra["sameSite"], "Lax");
    assert_eq!(cookies[1].path, "/");
    assert_eq!(cookies[1].expires, None);

    save_session(&path, &cookies).unwrap();
    let reloaded = load_session(&path).unwrap();
    assert_eq!(reloaded, cookies);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"httpOnly\": false"));
}

#[test]
fn malformed_session_file_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.json");
    fs::write(&path, "{ not a list").unwrap();
    assert!(matches!(
        load_session(&path),
        Err(SessionError::Parse { .. })
    ));
}

#[test]
fn session_is_saved_into_missing_directory() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state").join("cookies.json");
    save_session(&path, &[CookieRecord::new("a", "b", "example.com", false)]).unwrap();
    assert_eq!(load_session(&path).unwrap().len(), 1);
}

#[test]
fn saving_replaces_previous_session_without_leftovers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.json");
    save_session(&path, &[CookieRecord::new("old", "1", "example.com", false)]).unwrap();
    save_session(&path, &[CookieRecord::new("new", "2", "example.com", false)]).unwrap();

    let names: Vec<String> = load_session(&path)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["new"]);

    let entries: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["cookies.json"]);
}

#[test]
fn session_path_must_name_a_file() {
    let temp = TempDir::new().unwrap();
    let result = save_session(&temp.path().join(".."), &[]);
    assert!(matches!(
        result,
        Err(SessionError::Persist(PersistError::NoFileName(_)))
    ));
}
