use std::sync::Arc;

use bytes::Bytes;
use remote_storage::application::ports::{SettingsStore, StorageError};
use remote_storage::application::storage_service::{ServiceError, StorageService};
use remote_storage::infrastructure::settings::MemorySettings;

use test_fixtures::{
    aws_settings, azure_settings, build_zip, bundle_zip, local_settings, object_body, reader,
    stored_keys, TestEnvironment,
};

fn service(env: &TestEnvironment, settings: MemorySettings) -> StorageService {
    let settings: Arc<dyn SettingsStore> = Arc::new(settings);
    StorageService::new(Arc::clone(&env.factory), settings)
}

#[tokio::test]
async fn test_local_upload_extracts_bundle() {
    let env = TestEnvironment::new();
    let service = service(&env, local_settings());

    let url = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert_eq!(
        url.as_str(),
        "http://localhost:8080/remotes/checkout/1.4.0/remoteEntry.js"
    );

    let version_dir = env.content_root.path().join("remotes/checkout/1.4.0");
    assert_eq!(
        std::fs::read(version_dir.join("remoteEntry.js")).unwrap(),
        b"var remote = {};"
    );
    assert!(version_dir.join("js/app.js").is_file());
    assert!(version_dir.join("css/app.css").is_file());
    assert!(!version_dir.join(".gitkeep").exists());
    assert!(!version_dir.join("._app.js").exists());
    assert!(!version_dir.join("__MACOSX").exists());
}

#[tokio::test]
async fn test_local_upload_honours_storage_path() {
    let env = TestEnvironment::new();
    let service = service(&env, local_settings().with("storage:path", "bundles"));

    service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert!(env
        .content_root
        .path()
        .join("bundles/checkout/1.4.0/remoteEntry.js")
        .is_file());
}

#[tokio::test]
async fn test_s3_upload_writes_objects() {
    let env = TestEnvironment::new();
    let service = service(&env, aws_settings());

    let url = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert_eq!(
        url.as_str(),
        "https://remotes.s3.eu-west-1.amazonaws.com/checkout/1.4.0/remoteEntry.js"
    );
    assert_eq!(
        stored_keys(&env.connector.s3).await,
        vec![
            "checkout/1.4.0/css/app.css",
            "checkout/1.4.0/js/app.js",
            "checkout/1.4.0/remoteEntry.js",
        ]
    );
    assert_eq!(
        object_body(&env.connector.s3, "checkout/1.4.0/js/app.js").await,
        Bytes::from_static(b"console.log('app');")
    );
}

#[tokio::test]
async fn test_s3_custom_endpoint_uses_path_style_url() {
    let env = TestEnvironment::new();
    let service = service(
        &env,
        aws_settings().with("storage:aws:endpoint", "http://minio:9000"),
    );

    let url = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert_eq!(
        url.as_str(),
        "http://minio:9000/remotes/checkout/1.4.0/remoteEntry.js"
    );
}

#[tokio::test]
async fn test_azure_upload_ensures_container() {
    let env = TestEnvironment::new();
    let service = service(&env, azure_settings());

    let url = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert_eq!(
        url.as_str(),
        "https://acme.blob.core.windows.net/remotes/checkout/1.4.0/remoteEntry.js"
    );
    assert_eq!(
        *env.connector.admin.ensured.lock().unwrap(),
        vec!["remotes".to_string()]
    );
    assert_eq!(stored_keys(&env.connector.azure).await.len(), 3);
}

#[tokio::test]
async fn test_missing_secret_fails_before_provider_is_built() {
    let env = TestEnvironment::new();
    let service = service(&env, aws_settings().with("storage:aws:secret_key", "   "));

    let err = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Config(_)));
    assert_eq!(env.connector.build_count(), 0);
    assert!(stored_keys(&env.connector.s3).await.is_empty());
}

#[tokio::test]
async fn test_unknown_storage_type_is_config_error() {
    let env = TestEnvironment::new();
    let service = service(
        &env,
        MemorySettings::from_pairs([("storage:type", "ftp"), ("api:base_url", "http://x")]),
    );

    let err = service
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Config(_)));
}

#[tokio::test]
async fn test_invalid_coordinates_touch_no_backend() {
    let env = TestEnvironment::new();

    for (name, version) in [("../etc", "1.0.0"), ("checkout", ".."), ("", "1.0.0"), ("a/b", "1")] {
        for settings in [local_settings(), aws_settings(), azure_settings()] {
            let err = service(&env, settings)
                .upload(name, version, reader(bundle_zip()))
                .await
                .unwrap_err();
            assert!(
                matches!(err.storage_error(), Some(StorageError::Validation(_))),
                "{name:?}/{version:?} should be rejected"
            );
        }
    }

    assert!(!env.content_root.path().join("remotes").exists());
    assert!(stored_keys(&env.connector.s3).await.is_empty());
    assert!(stored_keys(&env.connector.azure).await.is_empty());
    assert!(env.connector.admin.ensured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_zip_slip_rejected_on_every_backend() {
    let env = TestEnvironment::new();
    let malicious = build_zip(&[
        ("dist/remoteEntry.js", b"entry"),
        ("dist/../../../outside.js", b"boom"),
    ]);

    for settings in [local_settings(), aws_settings(), azure_settings()] {
        let err = service(&env, settings)
            .upload("checkout", "1.4.0", reader(malicious.clone()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.storage_error(),
            Some(StorageError::PathEscape { .. })
        ));
        assert!(err.is_client_error());
    }

    assert!(!env.content_root.path().join("remotes").exists());
    assert!(!env.content_root.path().join("outside.js").exists());
    assert!(stored_keys(&env.connector.s3).await.is_empty());
    assert!(stored_keys(&env.connector.azure).await.is_empty());
}

#[tokio::test]
async fn test_malformed_and_empty_payloads() {
    let env = TestEnvironment::new();
    let service = service(&env, local_settings());

    let err = service
        .upload("checkout", "1.4.0", reader(Bytes::from_static(b"not a zip")))
        .await
        .unwrap_err();
    assert!(matches!(err.storage_error(), Some(StorageError::Malformed(_))));

    let err = service
        .upload("checkout", "1.4.0", reader(Bytes::new()))
        .await
        .unwrap_err();
    assert!(matches!(err.storage_error(), Some(StorageError::Validation(_))));
}

#[tokio::test]
async fn test_junk_only_archive_creates_empty_version() {
    let env = TestEnvironment::new();
    let junk = build_zip(&[("dist/.gitkeep", b""), ("__MACOSX/._x", b"junk")]);

    let url = service(&env, local_settings())
        .upload("checkout", "0.0.1", reader(junk.clone()))
        .await
        .unwrap();
    assert!(url.as_str().ends_with("/checkout/0.0.1/remoteEntry.js"));

    let version_dir = env.content_root.path().join("remotes/checkout/0.0.1");
    assert!(version_dir.is_dir());
    assert_eq!(std::fs::read_dir(&version_dir).unwrap().count(), 0);

    service(&env, aws_settings())
        .upload("checkout", "0.0.1", reader(junk))
        .await
        .unwrap();
    assert!(stored_keys(&env.connector.s3).await.is_empty());
}

#[tokio::test]
async fn test_reupload_replaces_version_when_staged() {
    let env = TestEnvironment::new();
    let first = build_zip(&[("dist/remoteEntry.js", b"v1"), ("dist/old.js", b"old")]);
    let second = build_zip(&[("dist/remoteEntry.js", b"v2")]);

    let first_url = service(&env, local_settings())
        .upload("checkout", "1.4.0", reader(first))
        .await
        .unwrap();
    let second_url = service(&env, local_settings())
        .upload("checkout", "1.4.0", reader(second))
        .await
        .unwrap();

    assert_eq!(first_url, second_url);
    let version_dir = env.content_root.path().join("remotes/checkout/1.4.0");
    assert_eq!(std::fs::read(version_dir.join("remoteEntry.js")).unwrap(), b"v2");
    assert!(!version_dir.join("old.js").exists());

    let name_dir = env.content_root.path().join("remotes/checkout");
    let leftovers: Vec<_> = std::fs::read_dir(&name_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, vec!["1.4.0".to_string()]);

    // Scratch trees sit beside the served directory and are emptied afterwards
    let remotes: Vec<_> = std::fs::read_dir(env.content_root.path().join("remotes"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(remotes, vec!["checkout".to_string()]);
    let scratch = env.content_root.path().join(".remotes.scratch");
    assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
}

#[tokio::test]
async fn test_reupload_overwrites_in_place_when_unstaged() {
    let env = TestEnvironment::new();
    let settings = || local_settings().with("storage:local:staged", "false");

    service(&env, settings())
        .upload(
            "checkout",
            "1.4.0",
            reader(build_zip(&[("dist/remoteEntry.js", b"v1"), ("dist/old.js", b"old")])),
        )
        .await
        .unwrap();
    service(&env, settings())
        .upload(
            "checkout",
            "1.4.0",
            reader(build_zip(&[("dist/remoteEntry.js", b"v2")])),
        )
        .await
        .unwrap();

    let version_dir = env.content_root.path().join("remotes/checkout/1.4.0");
    assert_eq!(std::fs::read(version_dir.join("remoteEntry.js")).unwrap(), b"v2");
    assert!(version_dir.join("old.js").exists());
}

#[tokio::test]
async fn test_settings_apply_per_service() {
    let env = TestEnvironment::new();

    service(&env, local_settings())
        .upload("checkout", "1.0.0", reader(bundle_zip()))
        .await
        .unwrap();
    service(&env, aws_settings())
        .upload("checkout", "1.0.0", reader(bundle_zip()))
        .await
        .unwrap();

    assert!(env
        .content_root
        .path()
        .join("remotes/checkout/1.0.0/remoteEntry.js")
        .is_file());
    assert_eq!(stored_keys(&env.connector.s3).await.len(), 3);
    assert_eq!(env.connector.build_count(), 2);
}

fn snapshot(dir: &std::path::Path) -> Vec<(String, Vec<u8>)> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(dir).unwrap().to_string_lossy().into_owned();
                files.push((relative, std::fs::read(&path).unwrap()));
            }
        }
    }
    files.sort();
    files
}

#[tokio::test]
async fn test_same_upload_twice_is_byte_identical() {
    let env = TestEnvironment::new();
    let version_dir = env.content_root.path().join("remotes/checkout/1.4.0");

    service(&env, local_settings())
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();
    let first = snapshot(&version_dir);

    service(&env, local_settings())
        .upload("checkout", "1.4.0", reader(bundle_zip()))
        .await
        .unwrap();
    let second = snapshot(&version_dir);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}
