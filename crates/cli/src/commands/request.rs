//! Raw API access.

use std::path::Path;

use placify_client::ApiClient;
use placify_client::http::multipart::{Form, Part};
use placify_client::http::{Method, RequestBody, RequestOptions};
use serde_json::Value;

use super::{CommandError, print_json};

/// GET `path` with optional query parameters and print the body.
pub async fn get(
    client: &ApiClient,
    path: &str,
    query: Vec<(String, String)>,
) -> Result<(), CommandError> {
    let options = RequestOptions {
        query,
        ..RequestOptions::default()
    };
    let response = client.get_with::<Value>(path, options).await?;
    print_json(&response.data)
}

/// Send a JSON body (`{}` when none is given) and print the response.
pub async fn send_json(
    client: &ApiClient,
    method: Method,
    path: &str,
    data: Option<String>,
) -> Result<(), CommandError> {
    let body: Value = match data {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Value::Object(serde_json::Map::new()),
    };

    let response = client
        .request::<Value>(method, path, RequestBody::Json(body), RequestOptions::default())
        .await?;
    print_json(&response.data)
}

pub async fn delete(client: &ApiClient, path: &str) -> Result<(), CommandError> {
    let response = client.delete::<Value>(path).await?;
    print_json(&response.data)
}

/// Upload `file` under `field`, plus any extra text fields.
pub async fn upload(
    client: &ApiClient,
    path: &str,
    file: &Path,
    field: &str,
    fields: Vec<(String, String)>,
    patch: bool,
) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| CommandError::ReadFile {
            path: file.display().to_string(),
            source,
        })?;

    let mut part = Part::bytes(bytes);
    if let Some(name) = file.file_name() {
        part = part.file_name(name.to_string_lossy().into_owned());
    }

    let form = fields
        .into_iter()
        .fold(Form::new().part(field.to_owned(), part), |form, (key, value)| {
            form.text(key, value)
        });

    let response = if patch {
        client.patch_multipart::<Value>(path, form).await?
    } else {
        client.post_multipart::<Value>(path, form).await?
    };
    print_json(&response.data)
}
