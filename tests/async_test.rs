use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use readwalk::{readdir, ErrorAction, Results, WalkError, WalkOptions};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn tree(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "temp").unwrap();
    }
    dir
}

fn sorted(results: Results) -> Vec<String> {
    let mut paths: Vec<String> = results
        .into_paths()
        .into_iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    paths.sort();
    paths
}

fn wide_tree() -> tempfile::TempDir {
    let mut names = Vec::new();
    for a in 0..6 {
        for b in 0..4 {
            names.push(format!("d{a}/e{b}/f.txt"));
            names.push(format!("d{a}/e{b}/g/h.txt"));
        }
    }
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    tree(&refs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_matches_sync() {
    let dir = wide_tree();

    let sync = sorted(readdir(dir.path()).recursive(true).run().unwrap());
    let concurrent = sorted(readdir(dir.path()).recursive(true).run_async().await.unwrap());

    assert_eq!(sync, concurrent);
    assert_eq!(concurrent.len(), 6 + 6 * 4 * 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parents_precede_descendants() {
    let dir = wide_tree();
    let results = readdir(dir.path()).recursive(true).run_async().await.unwrap();
    let paths = results.into_paths();

    for (i, path) in paths.iter().enumerate() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let at = paths.iter().position(|p| p == parent).unwrap();
            assert!(at < i, "{} listed after {}", parent.display(), path.display());
        }
    }
}

#[tokio::test]
async fn depth_applies_to_async_walks() {
    let dir = tree(&["a/b/c/d/e", "a/a/b/c/d"]);
    let paths = sorted(readdir(dir.path()).depth(3).run_async().await.unwrap());
    assert_eq!(paths, vec!["a", "a/a", "a/a/b", "a/b", "a/b/c"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unique_holds_across_concurrent_roots() {
    let dir = wide_tree();
    let root = dir.path().to_path_buf();
    let roots = vec![root.clone(), root.clone(), root.clone(), root];

    let paths = sorted(
        readdir(roots)
            .recursive(true)
            .unique(true)
            .run_async()
            .await
            .unwrap(),
    );
    let mut deduped = paths.clone();
    deduped.dedup();

    assert_eq!(paths, deduped);
    assert_eq!(paths.len(), 6 + 6 * 4 * 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hooks_run_for_every_entry() {
    let dir = wide_tree();
    let files = Arc::new(AtomicUsize::new(0));
    let dirs = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&files);
    let d = Arc::clone(&dirs);

    let results = readdir(dir.path())
        .recursive(true)
        .on_file(move |_| {
            f.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .on_directory(move |_| {
            d.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .run_async()
        .await
        .unwrap();

    assert_eq!(files.load(Ordering::Relaxed), 48);
    assert_eq!(dirs.load(Ordering::Relaxed), 6 + 24 + 24);
    assert_eq!(results.stats.files, 48);
    assert_eq!(results.stats.dirs, 54);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn on_directory_prunes_async() {
    let dir = tree(&["a/a/a.txt", "a/a/b.txt", "a/b/c/d.txt", "a/b/b/b.txt"]);

    let paths = sorted(
        readdir(dir.path())
            .recursive(true)
            .nodir(true)
            .on_directory(|dir| {
                dir.recurse = Some(dir.name() != "b");
                Ok(())
            })
            .run_async()
            .await
            .unwrap(),
    );

    assert_eq!(paths, vec!["a/a/a.txt", "a/a/b.txt"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn first_hook_error_fails_the_walk() {
    let dir = wide_tree();

    let err = readdir(dir.path())
        .recursive(true)
        .on_file(|file| {
            if file.name() == "h.txt" {
                return Err(WalkError::hook("no h"));
            }
            Ok(())
        })
        .run_async()
        .await
        .err()
        .unwrap();

    assert!(matches!(err, WalkError::Hook { .. }));
    assert!(err.path().unwrap().ends_with("h.txt"));
}

#[tokio::test]
async fn on_error_continue_keeps_walking() {
    let dir = tree(&["a/ok.txt", "a/bad.txt", "b/ok.txt"]);

    let paths = sorted(
        readdir(dir.path())
            .recursive(true)
            .nodir(true)
            .on_file(|file| {
                if file.name() == "bad.txt" {
                    return Err(WalkError::hook("bad"));
                }
                Ok(())
            })
            .on_error(|_| ErrorAction::Continue)
            .run_async()
            .await
            .unwrap(),
    );

    assert_eq!(paths, vec!["a/ok.txt", "b/ok.txt"]);
}

#[tokio::test]
async fn missing_root_fails_async() {
    let dir = tempfile::tempdir().unwrap();
    let roots = vec![dir.path().to_path_buf(), dir.path().join("missing")];
    let err = readwalk::walk(roots, &WalkOptions::default()).await.err().unwrap();
    assert!(matches!(err, WalkError::InvalidRoot(ref p) if p.ends_with("missing")));
}

#[tokio::test]
async fn empty_root_is_an_invalid_argument() {
    let err = readwalk::walk("", &WalkOptions::default()).await.err().unwrap();
    assert!(matches!(err, WalkError::InvalidArgument(_)));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn link_cycles_terminate_async() {
    let dir = tree(&["x/file.txt"]);
    std::os::unix::fs::symlink(dir.path().join("x"), dir.path().join("x/back")).unwrap();

    let paths = sorted(
        readdir(dir.path())
            .recursive(true)
            .follow(true)
            .run_async()
            .await
            .unwrap(),
    );

    assert_eq!(paths, vec!["x", "x/back", "x/file.txt"]);
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn link_to_the_root_is_not_walked_again_async() {
    let dir = wide_tree();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("d0/e0/up")).unwrap();

    let paths = sorted(
        readdir(dir.path())
            .recursive(true)
            .follow(true)
            .run_async()
            .await
            .unwrap(),
    );

    assert!(paths.contains(&"d0/e0/up".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("d0/e0/up/")));
    assert_eq!(paths.len(), 6 + 6 * 4 * 4 + 1);
}
