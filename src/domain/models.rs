use serde::{Deserialize, Serialize};

/// A plugin (or parameter) record as the store returns it: an opaque
/// attribute bag. The attribute set is owned by the store; the client
/// echoes whatever comes back.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One page of records from a paged collection endpoint.
///
/// The store also sends `hasPreviousPage` and `total`; the client has no
/// use for either, so serde drops them on the floor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}
