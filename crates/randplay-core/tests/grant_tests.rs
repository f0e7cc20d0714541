use std::fs;
use tempfile::tempdir;

use randplay_core::grants::{self, AccessGrant, ScopeRegistry};
use randplay_core::Error;

#[test]
fn test_create_grant_for_directory() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("media");
    fs::create_dir_all(&dir).unwrap();

    let grant = grants::create_grant(&dir).unwrap();
    assert!(!grant.token.is_empty());
    assert_eq!(grant.path, fs::canonicalize(&dir).unwrap().to_string_lossy());
}

#[test]
fn test_create_grant_missing_path_fails() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does_not_exist");

    match grants::create_grant(&missing) {
        Err(Error::GrantCreation { .. }) => {}
        other => panic!("Expected GrantCreation error, got {:?}", other),
    }
}

#[test]
fn test_create_grant_on_file_fails() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("not_a_dir.mp4");
    fs::write(&file, "data").unwrap();

    match grants::create_grant(&file) {
        Err(Error::GrantCreation { reason, .. }) => {
            assert!(reason.contains("not a directory"), "reason: {}", reason);
        }
        other => panic!("Expected GrantCreation error, got {:?}", other),
    }
}

#[test]
fn test_resolve_live_grant() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("media");
    fs::create_dir_all(&dir).unwrap();

    let grant = grants::create_grant(&dir).unwrap();
    let active = grants::resolve(&grant).unwrap();
    assert_eq!(active.path, fs::canonicalize(&dir).unwrap());
}

#[test]
fn test_resolve_deleted_directory_is_stale() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("media");
    fs::create_dir_all(&dir).unwrap();

    let grant = grants::create_grant(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    match grants::resolve(&grant) {
        Err(Error::StaleGrant { .. }) => {}
        other => panic!("Expected StaleGrant, got {:?}", other),
    }
}

#[test]
fn test_resolve_replaced_directory_is_stale() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("media");
    fs::create_dir_all(&dir).unwrap();

    let grant = grants::create_grant(&dir).unwrap();

    // Replace the directory with a different filesystem object at the
    // same path. The replacement is created while the original still
    // exists, so the two identities are guaranteed to differ.
    let replacement = tmp.path().join("replacement");
    fs::create_dir_all(&replacement).unwrap();
    fs::remove_dir_all(&dir).unwrap();
    fs::rename(&replacement, &dir).unwrap();

    match grants::resolve(&grant) {
        Err(Error::StaleGrant { reason, .. }) => {
            assert!(reason.contains("replaced"), "reason: {}", reason);
        }
        other => panic!("Expected StaleGrant, got {:?}", other),
    }
}

#[test]
fn test_resolve_garbage_token_is_stale() {
    let grant = AccessGrant {
        path: "/somewhere".to_string(),
        token: vec![0xFF, 0x00, 0x42],
        created_at: "2026-01-01T00:00:00Z".to_string(),
    };

    match grants::resolve(&grant) {
        Err(Error::StaleGrant { reason, .. }) => {
            assert!(reason.contains("unreadable"), "reason: {}", reason);
        }
        other => panic!("Expected StaleGrant, got {:?}", other),
    }
}

#[test]
fn test_scope_registry_pairing() {
    let mut scopes = ScopeRegistry::new();

    scopes.begin("/a").unwrap();
    assert!(scopes.is_held("/a"));
    assert_eq!(scopes.held_count(), 1);

    // Double-begin is an error; the scope stays held.
    assert!(matches!(scopes.begin("/a"), Err(Error::Scope { .. })));
    assert!(scopes.is_held("/a"));

    scopes.end("/a").unwrap();
    assert!(!scopes.is_held("/a"));

    // Double-release is guarded.
    assert!(matches!(scopes.end("/a"), Err(Error::Scope { .. })));
}

#[test]
fn test_scope_registry_release_all() {
    let mut scopes = ScopeRegistry::new();
    scopes.begin("/a").unwrap();
    scopes.begin("/b").unwrap();

    assert_eq!(scopes.release_all(), 2);
    assert_eq!(scopes.held_count(), 0);
    assert_eq!(scopes.release_all(), 0);
}
