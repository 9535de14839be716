use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::domain::models::{PagedResponse, Record};
use crate::error::StoreError;

/// Page size used when walking a plugin's parameter sub-resource.
pub const PARAMETER_PAGE_SIZE: u32 = 50;

/// How much of an error body makes it into an error message.
const ERROR_DETAIL_LIMIT: usize = 200;

/// Blocking client for the store's plugin collection.
///
/// The base URL is the collection itself; records live at `{base}{name}/`
/// and filtered listings go through `{base}search/`. Credentials, when
/// given, ride along as basic auth on every request.
pub struct StoreClient {
    base: String,
    http: Client,
    username: Option<String>,
    password: Option<String>,
}

impl StoreClient {
    pub fn new(
        url: &str,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base = normalize_base_url(url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base,
            http,
            username,
            password,
        })
    }

    /// One page of the plugin collection. An empty filter map lists the
    /// collection's default page; otherwise the filters become the query
    /// string of the search endpoint (`limit`/`offset` ride through like
    /// any other filter).
    pub fn list_plugins(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<PagedResponse, StoreError> {
        let req = if filters.is_empty() {
            debug!(url = %self.base, "listing plugins");
            self.http.get(self.base.clone())
        } else {
            let url = format!("{}search/", self.base);
            debug!(%url, filters = filters.len(), "searching plugins");
            self.http.get(url).query(filters)
        };
        let resp = self.send(req)?;
        Ok(resp.json()?)
    }

    /// One page of a plugin's CLI-parameter sub-resource.
    pub fn get_plugin_parameters(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
    ) -> Result<PagedResponse, StoreError> {
        let url = format!("{}{}/parameters/", self.base, name);
        debug!(%url, limit, offset, "fetching parameter page");
        let req = self
            .http
            .get(url)
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
        let resp = self.send(req)?;
        Ok(resp.json()?)
    }

    /// Every parameter record of one plugin: request pages of
    /// [`PARAMETER_PAGE_SIZE`], advance the offset by the limit and
    /// concatenate until the store reports no further page. No
    /// deduplication; the store is assumed to keep a stable order.
    pub fn collect_plugin_parameters(&self, name: &str) -> Result<Vec<Record>, StoreError> {
        let mut all = Vec::new();
        let mut offset = 0u32;
        loop {
            let page = self.get_plugin_parameters(name, PARAMETER_PAGE_SIZE, offset)?;
            all.extend(page.data);
            if !page.has_next_page {
                break;
            }
            offset += PARAMETER_PAGE_SIZE;
        }
        debug!(plugin = name, parameters = all.len(), "parameter walk done");
        Ok(all)
    }

    /// Create a plugin record. The descriptor is an opaque readable byte
    /// source of known length; it is consumed by the request and closed
    /// when the call returns.
    pub fn add_plugin<R>(
        &self,
        name: &str,
        dock_image: &str,
        public_repo: &str,
        descriptor: R,
        descriptor_len: u64,
        descriptor_name: &str,
    ) -> Result<Record, StoreError>
    where
        R: Read + Send + 'static,
    {
        let form = submission_form(
            name,
            dock_image,
            public_repo,
            descriptor,
            descriptor_len,
            descriptor_name,
        );
        debug!(plugin = name, "adding plugin");
        let resp = self.send(self.http.post(self.base.clone()).multipart(form))?;
        record_from_response(resp)
    }

    /// Update the record at `{base}{name}/`, same transport shape as
    /// [`StoreClient::add_plugin`]. `new_name` is the rename field; the
    /// empty string is the wire sentinel for "no rename".
    pub fn modify_plugin<R>(
        &self,
        name: &str,
        dock_image: &str,
        public_repo: &str,
        descriptor: R,
        descriptor_len: u64,
        descriptor_name: &str,
        new_name: &str,
    ) -> Result<Record, StoreError>
    where
        R: Read + Send + 'static,
    {
        let form = submission_form(
            new_name,
            dock_image,
            public_repo,
            descriptor,
            descriptor_len,
            descriptor_name,
        );
        let url = format!("{}{}/", self.base, name);
        debug!(%url, rename = !new_name.is_empty(), "modifying plugin");
        let resp = self.send(self.http.put(url).multipart(form))?;
        record_from_response(resp)
    }

    /// One DELETE against the record resource, nothing else.
    pub fn remove_plugin(&self, name: &str) -> Result<(), StoreError> {
        let url = format!("{}{}/", self.base, name);
        debug!(%url, "removing plugin");
        self.send(self.http.delete(url))?;
        Ok(())
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, StoreError> {
        let req = match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_deref()),
            None => req,
        };
        let resp = req.send()?;
        check_status(resp)
    }
}

fn normalize_base_url(url: &str) -> Result<String, StoreError> {
    let trimmed = url.trim();
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| StoreError::Argument(format!("invalid store URL '{trimmed}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(StoreError::Argument(format!(
                "unsupported store URL scheme '{other}' in '{trimmed}'"
            )));
        }
    }
    let mut base = parsed.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

fn submission_form<R>(
    name: &str,
    dock_image: &str,
    public_repo: &str,
    descriptor: R,
    descriptor_len: u64,
    descriptor_name: &str,
) -> Form
where
    R: Read + Send + 'static,
{
    let part =
        Part::reader_with_length(descriptor, descriptor_len).file_name(descriptor_name.to_string());
    Form::new()
        .text("name", name.to_string())
        .text("dock_image", dock_image.to_string())
        .text("public_repo", public_repo.to_string())
        .part("descriptor_file", part)
}

fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let detail = error_detail(resp);
    let message = describe_failure(status, &url, &detail);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(StoreError::Authorization(message))
    } else {
        Err(StoreError::Http(message))
    }
}

fn error_detail(resp: Response) -> String {
    let body = resp.text().unwrap_or_default();
    let trimmed = body.trim();
    let mut detail: String = trimmed.chars().take(ERROR_DETAIL_LIMIT).collect();
    if trimmed.chars().count() > ERROR_DETAIL_LIMIT {
        detail.push_str("...");
    }
    detail
}

fn describe_failure(status: StatusCode, url: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("{status} for {url}")
    } else {
        format!("{status} for {url} ({detail})")
    }
}

fn record_from_response(resp: Response) -> Result<Record, StoreError> {
    let value: serde_json::Value = resp.json()?;
    Ok(into_record(value))
}

/// The store answers create/update either with the record itself or with a
/// one-element `data` envelope; accept both shapes.
fn into_record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .find_map(|item| match item {
                    serde_json::Value::Object(record) => Some(record),
                    _ => None,
                })
                .unwrap_or_default(),
            Some(other) => {
                map.insert("data".to_string(), other);
                map
            }
            None => map,
        },
        _ => Record::default(),
    }
}
