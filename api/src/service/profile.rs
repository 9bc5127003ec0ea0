use std::{collections::HashMap, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use models::utils::RolesValue;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use url::Url;

use crate::{prelude::*, utils::config::ProfileStoreConfig};

/// The parts of a user's profile record that feed into a session token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRecord {
	/// The roles stored for the user, in any of the supported shapes
	pub roles: Option<RolesValue>,
	/// Whether the record grants platform-wide override privileges
	pub god_mode: Option<bool>,
	/// The name stored for the user
	pub display_name: Option<String>,
	/// The avatar stored for the user
	pub photo_url: Option<String>,
}

impl ProfileRecord {
	/// Reads a record out of a loosely typed JSON document. Fields of an
	/// unexpected type are treated as absent.
	pub fn from_document(document: &Map<String, Value>) -> Self {
		Self {
			roles: document.get("roles").cloned().and_then(RolesValue::from_json),
			god_mode: document.get("godMode").and_then(Value::as_bool),
			display_name: document
				.get("displayName")
				.and_then(Value::as_str)
				.map(str::to_string),
			photo_url: document
				.get("photoURL")
				.and_then(Value::as_str)
				.map(str::to_string),
		}
	}
}

/// Why a profile record could not be read
#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
	/// The store could not be reached, or did not answer in time
	#[error("the profile store is unavailable: {0}")]
	Unavailable(#[from] reqwest::Error),
	/// The store answered with a status other than success or not found
	#[error("the profile store answered with status {0}")]
	UnexpectedStatus(StatusCode),
	/// The store answered with something that is not a document
	#[error("the profile store returned a malformed document: {0}")]
	Malformed(String),
}

/// Read access to the user profile records
pub trait ProfileStore: Send + Sync {
	/// Reads the record of the given user, or `None` if they have none
	fn get_profile<'a>(
		&'a self,
		subject_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ProfileRecord>, ProfileStoreError>>;
}

/// A [`ProfileStore`] reading documents from Firestore over its REST API
#[derive(Debug, Clone)]
pub struct FirestoreProfileStore {
	/// The HTTP client, with the read timeout applied
	client: Client,
	/// Where the documents live and how to authenticate
	config: ProfileStoreConfig,
}

impl FirestoreProfileStore {
	/// Creates a store for the given configuration
	pub fn new(config: ProfileStoreConfig) -> Result<Self, reqwest::Error> {
		Ok(Self {
			client: Client::builder()
				.timeout(Duration::from_millis(config.timeout_ms))
				.build()?,
			config,
		})
	}

	/// The URL of the document for the given user
	fn document_url(&self, subject_id: &str) -> Result<Url, ProfileStoreError> {
		let mut url = self.config.endpoint.clone();
		url.path_segments_mut()
			.map_err(|()| ProfileStoreError::Malformed("endpoint cannot be a base".into()))?
			.pop_if_empty()
			.extend([
				"projects",
				self.config.project_id.as_str(),
				"databases",
				"(default)",
				"documents",
				self.config.collection.as_str(),
				subject_id,
			]);

		if let Some(api_key) = &self.config.api_key {
			url.query_pairs_mut().append_pair("key", api_key);
		}

		Ok(url)
	}
}

impl ProfileStore for FirestoreProfileStore {
	fn get_profile<'a>(
		&'a self,
		subject_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ProfileRecord>, ProfileStoreError>> {
		async move {
			let mut request = self.client.get(self.document_url(subject_id)?);
			if let Some(access_token) = &self.config.access_token {
				request = request.bearer_auth(access_token);
			}

			let response = request.send().await?;
			match response.status() {
				StatusCode::NOT_FOUND => {
					trace!("No profile record for user");
					return Ok(None);
				}
				status if !status.is_success() => {
					return Err(ProfileStoreError::UnexpectedStatus(status));
				}
				_ => (),
			}

			let document: Value = response.json().await?;
			let fields = match document.get("fields") {
				Some(Value::Object(fields)) => decode_fields(fields),
				// A document without fields is an empty record
				None => Map::new(),
				Some(_) => {
					return Err(ProfileStoreError::Malformed(
						"`fields` is not an object".into(),
					))
				}
			};

			Ok(Some(ProfileRecord::from_document(&fields)))
		}
		.boxed()
	}
}

/// Decodes the `fields` of a Firestore document into plain JSON
fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
	fields
		.iter()
		.map(|(name, value)| (name.clone(), decode_value(value)))
		.collect()
}

/// Decodes a single Firestore typed value (`{"stringValue": "..."}` and the
/// like) into plain JSON. Types with no JSON counterpart decode to `null`.
fn decode_value(value: &Value) -> Value {
	let Some((kind, inner)) = value.as_object().and_then(|object| object.iter().next()) else {
		return Value::Null;
	};

	match kind.as_str() {
		"stringValue" | "booleanValue" | "doubleValue" | "timestampValue" | "referenceValue" |
		"bytesValue" => inner.clone(),
		"integerValue" => inner
			.as_str()
			.and_then(|number| number.parse::<i64>().ok())
			.map(Value::from)
			.unwrap_or_else(|| inner.clone()),
		"arrayValue" => Value::Array(
			inner
				.get("values")
				.and_then(Value::as_array)
				.map(|values| values.iter().map(decode_value).collect())
				.unwrap_or_default(),
		),
		"mapValue" => Value::Object(
			inner
				.get("fields")
				.and_then(Value::as_object)
				.map(decode_fields)
				.unwrap_or_default(),
		),
		_ => Value::Null,
	}
}

/// A [`ProfileStore`] backed by a map, for local runs and tests
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
	/// The records, keyed by subject ID
	records: RwLock<HashMap<String, ProfileRecord>>,
}

impl InMemoryProfileStore {
	/// Creates an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores or replaces the record of a user
	pub async fn insert(&self, subject_id: impl Into<String>, record: ProfileRecord) {
		self.records.write().await.insert(subject_id.into(), record);
	}
}

impl ProfileStore for InMemoryProfileStore {
	fn get_profile<'a>(
		&'a self,
		subject_id: &'a str,
	) -> BoxFuture<'a, Result<Option<ProfileRecord>, ProfileStoreError>> {
		async move { Ok(self.records.read().await.get(subject_id).cloned()) }.boxed()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_firestore_document() {
		let fields = json!({
			"roles": { "arrayValue": { "values": [
				{ "stringValue": "admin" },
				{ "stringValue": "user" }
			] } },
			"godMode": { "booleanValue": true },
			"displayName": { "stringValue": "Sam" },
			"createdAt": { "timestampValue": "2024-01-01T00:00:00Z" },
			"logins": { "integerValue": "42" },
			"location": { "geoPointValue": { "latitude": 1.0, "longitude": 2.0 } }
		});

		let decoded = decode_fields(fields.as_object().unwrap());

		assert_eq!(decoded["roles"], json!(["admin", "user"]));
		assert_eq!(decoded["godMode"], json!(true));
		assert_eq!(decoded["logins"], json!(42));
		assert_eq!(decoded["location"], Value::Null);

		let record = ProfileRecord::from_document(&decoded);
		assert_eq!(record.god_mode, Some(true));
		assert_eq!(record.display_name.as_deref(), Some("Sam"));
		assert_eq!(record.photo_url, None);
		assert_eq!(
			record.roles.map(RolesValue::into_role_set).unwrap().len(),
			2
		);
	}

	#[test]
	fn decodes_role_flag_maps() {
		let fields = json!({
			"roles": { "mapValue": { "fields": {
				"admin": { "booleanValue": true },
				"user": { "booleanValue": false }
			} } }
		});

		let record = ProfileRecord::from_document(&decode_fields(fields.as_object().unwrap()));

		assert_eq!(
			record.roles.map(RolesValue::into_role_set).unwrap(),
			BTreeSet::from(["admin".to_string()])
		);
	}

	#[test]
	fn document_url_is_escaped() {
		let store = FirestoreProfileStore::new(ProfileStoreConfig {
			project_id: "bndy".to_string(),
			collection: "bf_users".to_string(),
			endpoint: Url::parse("https://firestore.googleapis.com/v1/").unwrap(),
			access_token: None,
			api_key: Some("key123".to_string()),
			timeout_ms: 3000,
		})
		.unwrap();

		assert_eq!(
			store.document_url("a/b").unwrap().as_str(),
			"https://firestore.googleapis.com/v1/projects/bndy/databases/(default)/documents/bf_users/a%2Fb?key=key123"
		);
	}

	#[tokio::test]
	async fn in_memory_store_returns_inserted_records() {
		let store = InMemoryProfileStore::new();
		store
			.insert(
				"u1",
				ProfileRecord {
					god_mode: Some(true),
					..Default::default()
				},
			)
			.await;

		assert_eq!(
			store.get_profile("u1").await.unwrap().unwrap().god_mode,
			Some(true)
		);
		assert!(store.get_profile("u2").await.unwrap().is_none());
	}
}
