use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tracing::{debug, error};

use crate::application::archive::ArchiveUpload;
use crate::application::ports::StorageError;

/// MIME type for a bundle file, by extension
pub fn content_type_for(relative_path: &str) -> &'static str {
    let extension = relative_path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "js" | "mjs" | "cjs" => "text/javascript",
        "css" => "text/css",
        "json" | "map" => "application/json",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// PUT every ingested entry as `{name}/{version}/{relative_path}`, one at a time.
///
/// The first failing PUT aborts the upload. Objects written before it stay
/// in place; re-uploading the same version overwrites them.
pub async fn put_entries(
    store: &dyn ObjectStore,
    upload: &mut ArchiveUpload,
) -> Result<usize, StorageError> {
    let coordinates = upload.coordinates().clone();
    let mut written = 0;

    for entry in upload.entries() {
        let entry = entry?;
        let key = coordinates.object_key(&entry.relative_path);
        let size = entry.contents.len();

        // `parse` keeps the key verbatim; `From<&str>` would percent-encode `~`, `[`, `%`
        let path = ObjectPath::parse(&key).map_err(|e| {
            StorageError::Malformed(format!("Unusable object key {:?}: {}", key, e))
        })?;

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            content_type_for(&entry.relative_path).into(),
        );
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        store
            .put_opts(&path, PutPayload::from(entry.contents), options)
            .await
            .map_err(|e| {
                error!(
                    artifact = %coordinates,
                    key = %key,
                    uploaded = written,
                    error = %e,
                    "Object PUT failed, earlier objects are left in place"
                );
                StorageError::backend(format!("uploading {}", key), e)
            })?;

        debug!(key = %key, size, "Uploaded archive entry");
        written += 1;
    }

    Ok(written)
}
