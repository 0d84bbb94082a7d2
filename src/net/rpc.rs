#![cfg(feature = "net")]

//! Blocking JSON-RPC client for a Sui full node.

use crate::error::ComposeError;
use crate::transport::{CoinObject, LedgerReader, ObjectData, OwnedObject};
use crate::types::{ObjectId, SuiAddress};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::cell::Cell;
use std::time::Duration;
use tracing::debug;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const MAX_PAGES: usize = 50;
const PAGE_LIMIT: u64 = 50;

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Cursor for the next page, when there is one.
    pub next_cursor: Option<Value>,
}

/// [`LedgerReader`] over a full node's JSON-RPC endpoint.
pub struct RpcClient {
    endpoint: String,
    client: Client,
    next_id: Cell<u64>,
}

impl RpcClient {
    /// Client for `endpoint` with the default request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ComposeError> {
        Self::with_timeout(endpoint, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Client for `endpoint` with an explicit request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ComposeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposeError::Transport(format!("rpc client error: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
            next_id: Cell::new(1),
        })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and returns its `result`.
    pub fn call(&self, method: &str, params: Value) -> Result<Value, ComposeError> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(evt = "rpc_request", method, id);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .map_err(|e| ComposeError::Transport(format!("{method} request failed: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(ComposeError::Transport(format!("{method} status {status}: {body}")));
        }
        let value: Value = resp
            .json()
            .map_err(|e| ComposeError::Transport(format!("{method} decode failed: {e}")))?;
        parse_envelope(method, value)
    }

    fn paginate<T>(
        &self,
        method: &str,
        params: impl Fn(&Value) -> Value,
        parse: impl Fn(&Value) -> Result<Page<T>, ComposeError>,
    ) -> Result<Vec<T>, ComposeError> {
        let mut items = Vec::new();
        let mut cursor = Value::Null;
        for _ in 0..MAX_PAGES {
            let page = parse(&self.call(method, params(&cursor))?)?;
            items.extend(page.data);
            match page.next_cursor {
                Some(next) => cursor = next,
                None => return Ok(items),
            }
        }
        Err(ComposeError::Decode(format!(
            "{method} returned more than {MAX_PAGES} pages"
        )))
    }
}

impl LedgerReader for RpcClient {
    fn owned_objects(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Vec<OwnedObject>, ComposeError> {
        self.paginate(
            "suix_getOwnedObjects",
            |cursor| {
                json!([
                    owner.to_string(),
                    {
                        "filter": { "StructType": struct_type },
                        "options": { "showType": true }
                    },
                    cursor,
                    PAGE_LIMIT
                ])
            },
            parse_owned_page,
        )
    }

    fn object(&self, id: &ObjectId) -> Result<Option<ObjectData>, ComposeError> {
        let result = self.call(
            "sui_getObject",
            json!([id.to_string(), { "showType": true, "showContent": true }]),
        )?;
        parse_object_response(&result)
    }

    fn coins(&self, owner: &SuiAddress, coin_type: &str) -> Result<Vec<CoinObject>, ComposeError> {
        self.paginate(
            "suix_getCoins",
            |cursor| json!([owner.to_string(), coin_type, cursor, PAGE_LIMIT]),
            parse_coin_page,
        )
    }
}

/// Unwraps a JSON-RPC response; error objects become `LedgerRejected`.
pub fn parse_envelope(method: &str, value: Value) -> Result<Value, ComposeError> {
    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ComposeError::LedgerRejected(format!("{method}: {code} {message}")));
    }
    match value {
        Value::Object(mut fields) => fields
            .remove("result")
            .ok_or_else(|| ComposeError::Decode(format!("{method}: response has no result"))),
        _ => Err(ComposeError::Decode(format!("{method}: response is not an object"))),
    }
}

fn page_of<T>(
    result: &Value,
    item: impl Fn(&Value) -> Result<T, ComposeError>,
) -> Result<Page<T>, ComposeError> {
    let data = result
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ComposeError::Decode("page has no data array".into()))?
        .iter()
        .map(item)
        .collect::<Result<Vec<_>, _>>()?;
    let has_next = result
        .get("hasNextPage")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let next_cursor = result
        .get("nextCursor")
        .filter(|cursor| has_next && !cursor.is_null())
        .cloned();
    Ok(Page { data, next_cursor })
}

fn str_field<'v>(value: &'v Value, key: &str) -> Result<&'v str, ComposeError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ComposeError::Decode(format!("missing `{key}`")))
}

fn u64_field(value: &Value, key: &str) -> Result<u64, ComposeError> {
    match value.get(key) {
        Some(Value::String(raw)) => raw
            .parse()
            .map_err(|_| ComposeError::Decode(format!("`{key}` is not a u64: {raw}"))),
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or_else(|| ComposeError::Decode(format!("`{key}` is not a u64: {number}"))),
        _ => Err(ComposeError::Decode(format!("missing `{key}`"))),
    }
}

/// Parses a `suix_getOwnedObjects` result.
pub fn parse_owned_page(result: &Value) -> Result<Page<OwnedObject>, ComposeError> {
    page_of(result, |entry| {
        let data = entry
            .get("data")
            .ok_or_else(|| ComposeError::Decode("owned object entry has no data".into()))?;
        Ok(OwnedObject {
            object_id: str_field(data, "objectId")?.parse()?,
            version: u64_field(data, "version")?,
            object_type: str_field(data, "type")?.to_string(),
        })
    })
}

/// Parses a `suix_getCoins` result.
pub fn parse_coin_page(result: &Value) -> Result<Page<CoinObject>, ComposeError> {
    page_of(result, |entry| {
        Ok(CoinObject {
            object_id: str_field(entry, "coinObjectId")?.parse()?,
            balance: u64_field(entry, "balance")?,
        })
    })
}

/// Parses a `sui_getObject` result; a missing or deleted object is `None`.
pub fn parse_object_response(result: &Value) -> Result<Option<ObjectData>, ComposeError> {
    if result.get("error").is_some() {
        return Ok(None);
    }
    let Some(data) = result.get("data").filter(|data| !data.is_null()) else {
        return Ok(None);
    };
    let fields = data
        .get("content")
        .and_then(|content| content.get("fields"))
        .cloned()
        .unwrap_or(Value::Null);
    Ok(Some(ObjectData {
        object_id: str_field(data, "objectId")?.parse()?,
        object_type: str_field(data, "type")?.to_string(),
        fields,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_is_ledger_rejection() {
        let err = parse_envelope(
            "sui_getObject",
            json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32602, "message": "Invalid params" } }),
        )
        .unwrap_err();
        match err {
            ComposeError::LedgerRejected(message) => {
                assert!(message.contains("-32602"));
                assert!(message.contains("Invalid params"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn envelope_without_result_is_decode_error() {
        assert!(matches!(
            parse_envelope("m", json!({ "jsonrpc": "2.0", "id": 1 })),
            Err(ComposeError::Decode(_))
        ));
    }

    #[test]
    fn owned_page_with_cursor() {
        let page = parse_owned_page(&json!({
            "data": [
                { "data": { "objectId": "0x11", "version": "7", "digest": "abc", "type": "0x2::m::Cap<0x3::t::T>" } },
                { "data": { "objectId": "0x12", "version": "9", "digest": "def", "type": "0x2::m::Cap<0x3::t::T>" } }
            ],
            "nextCursor": "0x12",
            "hasNextPage": true
        }))
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].object_id, "0x11".parse().unwrap());
        assert_eq!(page.data[1].version, 9);
        assert_eq!(page.next_cursor, Some(json!("0x12")));
    }

    #[test]
    fn last_page_has_no_cursor() {
        let page = parse_coin_page(&json!({
            "data": [{ "coinType": "0x2::sui::SUI", "coinObjectId": "0xc0", "version": "1", "digest": "x", "balance": "1500" }],
            "nextCursor": "0xc0",
            "hasNextPage": false
        }))
        .unwrap();
        assert_eq!(page.data[0].balance, 1_500);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn object_response_extracts_fields() {
        let object = parse_object_response(&json!({
            "data": {
                "objectId": "0x4b",
                "version": "3",
                "type": "0xab::liquid_staking::LiquidStakingInfo<0xcd::lst::LST>",
                "content": {
                    "dataType": "moveObject",
                    "type": "0xab::liquid_staking::LiquidStakingInfo<0xcd::lst::LST>",
                    "fields": { "fees": "5" }
                }
            }
        }))
        .unwrap()
        .unwrap();
        assert_eq!(object.object_id, "0x4b".parse().unwrap());
        assert_eq!(object.fields["fees"], json!("5"));
    }

    #[test]
    fn missing_object_is_none() {
        let result = json!({ "error": { "code": "notExists", "object_id": "0x4b" } });
        assert_eq!(parse_object_response(&result).unwrap(), None);
    }

    #[test]
    fn malformed_balance_is_reported() {
        assert!(matches!(
            parse_coin_page(&json!({ "data": [{ "coinObjectId": "0x1", "balance": "lots" }] })),
            Err(ComposeError::Decode(_))
        ));
    }
}
