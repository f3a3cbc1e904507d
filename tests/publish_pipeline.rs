//! Pipeline-level tests driving `publish` directly, with the external
//! tools replaced by mockall collaborators so no real processes run.

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use docpub::config::PublishConfig;
use docpub::contract::{BuildFailure, MockDocBuilder, MockVcs, VcsFailure};
use docpub::publish::{publish, PublishError, COMMIT_MESSAGE};

/// Config rooted in a scratch working directory with a prepared
/// output tree containing `files` relative paths.
fn test_config(working_dir: &std::path::Path, files: &[&str]) -> PublishConfig {
    let output_dir = PathBuf::from("doc-out");
    let output_tree = working_dir.join(&output_dir);
    for rel in files {
        let path = output_tree.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("content of {rel}")).unwrap();
    }
    if files.is_empty() {
        fs::create_dir_all(&output_tree).unwrap();
    }

    PublishConfig {
        project_name: "runas".to_string(),
        remote_url: "file:///tmp/remote.git".to_string(),
        branch_name: "gh-pages".to_string(),
        build_command: "true".to_string(),
        output_dir,
        working_dir: working_dir.to_path_buf(),
    }
}

fn vcs_ok() -> MockVcs {
    let mut vcs = MockVcs::new();
    vcs.expect_init().times(1).returning(|_| Ok(()));
    vcs.expect_add_all().times(1).returning(|_| Ok(()));
    vcs.expect_commit().times(1).returning(|_, _| Ok(()));
    vcs.expect_checkout_branch().times(1).returning(|_, _| Ok(()));
    vcs.expect_force_push().times(1).returning(|_, _, _| Ok(()));
    vcs
}

#[tokio::test]
async fn successful_run_leaves_no_staging_directory() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html", "runas/all.html"]);
    let staging_dir = config.staging_dir();

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let report = publish(&config, &builder, &vcs_ok())
        .await
        .expect("publish should succeed");

    assert_eq!(report.files_published, 3, "two artifacts plus the redirect");
    assert_eq!(report.branch, "gh-pages");
    assert_eq!(report.commit_message, COMMIT_MESSAGE);
    assert!(
        !staging_dir.exists(),
        "staging directory must be removed after a successful run"
    );
}

/// At commit time the staging area must hold the copied tree and the
/// redirect document with the interpolated project path.
#[tokio::test]
async fn staging_area_holds_artifacts_and_redirect_at_commit_time() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html"]);

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let mut vcs = MockVcs::new();
    vcs.expect_init().times(1).returning(|_| Ok(()));
    vcs.expect_add_all().times(1).returning(|_| Ok(()));
    vcs.expect_commit().times(1).returning(|dir, msg| {
        assert_eq!(msg, COMMIT_MESSAGE);
        assert!(dir.join("runas/index.html").exists());
        let redirect = fs::read_to_string(dir.join("index.html")).unwrap();
        assert!(
            redirect.contains("./runas/"),
            "redirect must reference ./runas/, got: {redirect}"
        );
        Ok(())
    });
    vcs.expect_checkout_branch()
        .times(1)
        .returning(|_, branch| {
            assert_eq!(branch, "gh-pages");
            Ok(())
        });
    vcs.expect_force_push()
        .times(1)
        .returning(|_, remote, branch| {
            assert_eq!(remote, "file:///tmp/remote.git");
            assert_eq!(branch, "gh-pages");
            Ok(())
        });

    publish(&config, &builder, &vcs)
        .await
        .expect("publish should succeed");
}

#[tokio::test]
async fn build_failure_creates_no_staging_directory_and_skips_vcs() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html"]);
    let staging_dir = config.staging_dir();

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| {
        Err(BuildFailure::Exited {
            status: Some(101),
            stderr: "error: could not document the crate".to_string(),
        })
    });

    // No vcs operation may run after a failed build.
    let mut vcs = MockVcs::new();
    vcs.expect_init().times(0);
    vcs.expect_force_push().times(0);

    let err = publish(&config, &builder, &vcs).await.unwrap_err();

    assert!(matches!(err, PublishError::Build(_)));
    assert!(
        err.to_string().contains("could not document the crate"),
        "builder stderr must be surfaced verbatim, got: {err}"
    );
    assert!(
        !staging_dir.exists(),
        "a build failure must not create the staging directory"
    );
}

#[tokio::test]
async fn push_failure_still_removes_staging_directory() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html"]);
    let staging_dir = config.staging_dir();

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let mut vcs = MockVcs::new();
    vcs.expect_init().times(1).returning(|_| Ok(()));
    vcs.expect_add_all().times(1).returning(|_| Ok(()));
    vcs.expect_commit().times(1).returning(|_, _| Ok(()));
    vcs.expect_checkout_branch().times(1).returning(|_, _| Ok(()));
    vcs.expect_force_push().times(1).returning(|_, _, _| {
        Err(VcsFailure::Exited {
            subcommand: "push",
            status: Some(128),
            stderr: "fatal: unable to access remote".to_string(),
        })
    });

    let err = publish(&config, &builder, &vcs).await.unwrap_err();

    assert!(matches!(err, PublishError::Push(_)));
    assert!(err.to_string().contains("unable to access remote"));
    assert!(
        !staging_dir.exists(),
        "cleanup must run even when the push fails"
    );
}

#[tokio::test]
async fn repo_init_failure_still_removes_staging_directory() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html"]);
    let staging_dir = config.staging_dir();

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let mut vcs = MockVcs::new();
    vcs.expect_init().times(1).returning(|_| {
        Err(VcsFailure::Spawn {
            subcommand: "init",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
        })
    });
    vcs.expect_add_all().times(0);

    let err = publish(&config, &builder, &vcs).await.unwrap_err();

    assert!(matches!(err, PublishError::RepoInit(_)));
    assert!(!staging_dir.exists());
}

#[tokio::test]
async fn preexisting_staging_directory_is_a_staging_error() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html"]);
    let staging_dir = config.staging_dir();
    fs::create_dir_all(&staging_dir).unwrap();

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let mut vcs = MockVcs::new();
    vcs.expect_init().times(0);

    let err = publish(&config, &builder, &vcs).await.unwrap_err();

    assert!(matches!(err, PublishError::Staging(_)));
    assert!(
        staging_dir.exists(),
        "a staging directory the run did not create must not be removed"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_artifact_is_a_copy_error_naming_the_file() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path(), &["runas/index.html", "runas/secret.html"]);
    let staging_dir = config.staging_dir();
    let secret = config.output_tree().join("runas/secret.html");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&secret).is_ok() {
        // Permission bits are not enforced here (e.g. running as root).
        return;
    }

    let mut builder = MockDocBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));

    let mut vcs = MockVcs::new();
    vcs.expect_init().times(1).returning(|_| Ok(()));
    vcs.expect_add_all().times(0);

    let err = publish(&config, &builder, &vcs).await.unwrap_err();

    match &err {
        PublishError::Copy(copy) => assert_eq!(copy.path, secret),
        other => panic!("expected Copy error, got: {other:?}"),
    }
    assert!(
        !staging_dir.exists(),
        "cleanup must run even when the copy fails"
    );
}
