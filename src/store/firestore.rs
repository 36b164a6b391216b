//! Playlist store over the Firestore REST API (v1)

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{PlaylistStore, PLAYLISTS_COLLECTION};
use crate::model::{Track, UNTITLED_PLAYLIST};

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

const LIST_PAGE_SIZE: u32 = 300;

/// A Firestore typed value; only the variants playlists use
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_value: Option<ArrayValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_value: Option<MapValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

impl Value {
    fn string(s: &str) -> Self {
        Self {
            string_value: Some(s.to_string()),
            ..Default::default()
        }
    }

    fn as_str(&self) -> Option<&str> {
        self.string_value.as_deref()
    }
}

fn track_to_value(track: &Track) -> Value {
    let fields = [
        ("name", &track.name),
        ("artist", &track.artist),
        ("imageUrl", &track.image_url),
        ("previewUrl", &track.preview_url),
        ("duration", &track.duration),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), Value::string(value)))
    .collect();

    Value {
        map_value: Some(MapValue { fields }),
        ..Default::default()
    }
}

fn value_to_track(value: &Value) -> Option<Track> {
    let fields = &value.map_value.as_ref()?.fields;
    let field = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(Track {
        name: field("name"),
        artist: field("artist"),
        preview_url: field("previewUrl"),
        duration: field("duration"),
        image_url: field("imageUrl"),
    })
}

fn document_id(document_name: &str) -> &str {
    document_name.rsplit('/').next().unwrap_or(document_name)
}

#[derive(Clone)]
pub struct FirestorePlaylistStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

impl FirestorePlaylistStore {
    /// Every request gives up after `timeout`; a timeout is reported as an error.
    pub fn new(base_url: &str, project_id: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key,
        })
    }

    /// Resource name of the database's document root
    fn documents_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn playlist_path(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path(), PLAYLISTS_COLLECTION, id)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.base_url, resource)
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(resource));
        match &self.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }

    async fn send(operation: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(operation, %status, body = %body, "Firestore error body");
            bail!("{operation} failed with status {status}");
        }
        Ok(response)
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<ListDocumentsResponse> {
        let resource = format!("{}/{}", self.documents_path(), PLAYLISTS_COLLECTION);
        let mut builder = self
            .request(Method::GET, &resource)
            .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
        if let Some(token) = page_token {
            builder = builder.query(&[("pageToken", token)]);
        }
        let response = Self::send("list_playlists", builder).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PlaylistStore for FirestorePlaylistStore {
    async fn create(&self, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        crate::log_api_request!("create_playlist", id = %id, name);

        let resource = format!("{}/{}", self.documents_path(), PLAYLISTS_COLLECTION);
        let no_tracks = Value {
            array_value: Some(ArrayValue::default()),
            ..Default::default()
        };
        let body = json!({
            "fields": {
                "name": Value::string(name),
                "tracks": no_tracks,
            }
        });
        let builder = self
            .request(Method::POST, &resource)
            .query(&[("documentId", id.as_str())])
            .json(&body);

        let result = Self::send("create_playlist", builder).await;
        crate::log_api_result!("create_playlist", result);
        result?;
        Ok(id)
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<()> {
        crate::log_api_request!("rename_playlist", id, new_name);
        let body = json!({ "fields": { "name": Value::string(new_name) } });
        let builder = self
            .request(Method::PATCH, &self.playlist_path(id))
            .query(&[("updateMask.fieldPaths", "name"), ("currentDocument.exists", "true")])
            .json(&body);

        let result = Self::send("rename_playlist", builder).await;
        crate::log_api_result!("rename_playlist", result);
        result.map(|_| ())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        crate::log_api_request!("delete_playlist", id);
        let builder = self.request(Method::DELETE, &self.playlist_path(id));

        let result = Self::send("delete_playlist", builder).await;
        crate::log_api_result!("delete_playlist", result);
        result.map(|_| ())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>> {
        let mut playlists = BTreeMap::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            for document in page.documents {
                let name = document
                    .fields
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(UNTITLED_PLAYLIST)
                    .to_string();
                playlists.insert(document_id(&document.name).to_string(), name);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = playlists.len(), "Playlists listed");
        Ok(playlists)
    }

    async fn fetch_tracks(&self, id: &str) -> Result<Vec<Track>> {
        crate::log_api_request!("fetch_tracks", id);
        let builder = self.request(Method::GET, &self.playlist_path(id));
        let response = Self::send("fetch_tracks", builder).await?;
        let document: Document = response.json().await?;

        let tracks = document
            .fields
            .get("tracks")
            .and_then(|v| v.array_value.as_ref())
            .map(|array| array.values.iter().filter_map(value_to_track).collect())
            .unwrap_or_default();
        Ok(tracks)
    }

    async fn append_track(&self, id: &str, track: &Track) -> Result<()> {
        crate::log_api_request!("append_track", id, track = %track.name);
        let body = json!({
            "writes": [{
                "transform": {
                    "document": self.playlist_path(id),
                    "fieldTransforms": [{
                        "fieldPath": "tracks",
                        "appendMissingElements": { "values": [track_to_value(track)] },
                    }],
                },
            }],
        });
        let resource = format!("{}:commit", self.documents_path());
        let builder = self.request(Method::POST, &resource).json(&body);

        let result = Self::send("append_track", builder).await;
        crate::log_api_result!("append_track", result);
        result.map(|_| ())
    }
}
