use mediaingest_types::{
    AssetData, IngestManifestAssetData, IngestManifestFileData, IngestManifestFileState,
    ManifestAssetId, ManifestFileId, ManifestId,
};
use pretty_assertions::assert_eq;

fn parent() -> IngestManifestAssetData {
    IngestManifestAssetData {
        id: Some(ManifestAssetId::new()),
        parent_ingest_manifest_id: Some(ManifestId::new()),
        asset: AssetData {
            name: "movie".to_string(),
            ..Default::default()
        },
    }
}

#[test]
fn pending_record_has_no_id() {
    let data = IngestManifestFileData::pending("clip.mp4", 42);
    assert_eq!(data.name, "clip.mp4");
    assert_eq!(data.content_file_size, 42);
    assert_eq!(data.state, IngestManifestFileState::Pending);
    assert!(!data.is_persisted());
}

#[test]
fn with_parent_copies_asset_and_manifest_ids() {
    let parent = parent();
    let data = IngestManifestFileData::pending("clip.mp4", 1).with_parent(&parent);
    assert_eq!(data.parent_ingest_manifest_asset_id, parent.id);
    assert_eq!(data.parent_ingest_manifest_id, parent.parent_ingest_manifest_id);
}

#[test]
fn serializes_camel_case_and_skips_missing_id() {
    let data = IngestManifestFileData::pending("clip.mp4", 7);
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["name"], "clip.mp4");
    assert_eq!(json["contentFileSize"], 7);
    assert_eq!(json["state"], "Pending");
    assert!(json.get("id").is_none());
    assert!(json.get("created").is_none());
}

#[test]
fn from_slice_reads_server_entity() {
    let id = ManifestFileId::new();
    let body = format!(
        concat!(
            r#"{{"id":"{id}","name":"testData","contentFileSize":3,"#,
            r#""state":"Finished","created":"2024-05-01T10:00:00Z"}}"#,
        ),
        id = id
    );
    let data = IngestManifestFileData::from_slice(body.as_bytes()).unwrap();
    assert_eq!(data.id, Some(id));
    assert_eq!(data.name, "testData");
    assert_eq!(data.state, IngestManifestFileState::Finished);
    assert!(data.is_persisted());
    assert!(data.created.is_some());
    assert!(!data.is_primary);
}

#[test]
fn from_slice_rejects_garbage() {
    let err = IngestManifestFileData::from_slice(b"not json").unwrap_err();
    assert!(format!("{err}").contains("serialization"));
}

#[test]
fn asset_record_serde_roundtrip() {
    let parent = parent();
    let json = serde_json::to_string(&parent).unwrap();
    let back: IngestManifestAssetData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, parent);
}
