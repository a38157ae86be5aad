//! Metadata extraction from the registry's package JSON document.

use crate::types::{LatestRelease, Metadata};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Pull structured metadata out of a loosely shaped package document.
///
/// The document is expected to carry top-level `info` and `releases`
/// objects, but nothing is required: absent, null or mistyped fields
/// degrade to `None`/empty, never to an error.
pub fn extract_metadata(doc: &Value) -> Metadata {
    let empty = Map::new();

    let info = doc
        .get("info")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let releases = doc
        .get("releases")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    // Raw string sort, deliberately not semver: "10.0.0" sorts before
    // "2.0.0".
    let mut all_versions: Vec<String> = releases.keys().cloned().collect();
    all_versions.sort();

    let version = str_field(info, "version");
    let latest_release = latest_release(version.as_deref(), releases);

    Metadata {
        summary: str_field(info, "summary"),
        author: str_field(info, "author"),
        author_email: str_field(info, "author_email"),
        license: license_field(info),
        homepage: str_field(info, "home_page"),
        project_url: str_field(info, "project_url"),
        project_urls: url_map(info.get("project_urls")),
        requires_python: str_field(info, "requires_python"),
        requires_dist: str_list(info.get("requires_dist")),
        release_count: all_versions.len(),
        latest_release,
        all_versions,
        version,
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `license`, falling back to `license_expression` when absent or empty.
fn license_field(info: &Map<String, Value>) -> Option<String> {
    str_field(info, "license")
        .filter(|s| !s.is_empty())
        .or_else(|| str_field(info, "license_expression"))
}

fn url_map(value: Option<&Value>) -> Option<BTreeMap<String, Option<String>>> {
    let obj = value?.as_object()?;
    Some(
        obj.iter()
            .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string)))
            .collect(),
    )
}

fn str_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The release the index currently reports as current: the entry under
/// `releases[info.version]`, first file in index-reported order. This is
/// not necessarily the chronologically newest upload.
fn latest_release(
    version: Option<&str>,
    releases: &Map<String, Value>,
) -> Option<LatestRelease> {
    let version = version?;
    let files = releases.get(version)?.as_array()?;
    let first = files.first()?;

    Some(LatestRelease {
        version: version.to_string(),
        timestamp: first
            .get("upload_time_iso_8601")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
