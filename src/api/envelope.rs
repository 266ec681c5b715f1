//! Encoding of GraphQL requests into HTTP-style invocation payloads, and decoding of the
//! responses that come back.
//!
//! Functions behind the invocation transport expect the same event an API gateway would
//! deliver for an HTTP request: headers, a method, a path and a string body. The request
//! body and the policy header are themselves JSON documents serialized to strings, so a
//! request is encoded twice.
//!
//! Responses are wrapped the same way. The invocation returns an outer envelope whose
//! `body` is a string holding the GraphQL response:
//!
//! ```text
//! {"body": "{\"data\": {...}, \"errors\": [{\"message\": \"...\"}]}"}
//! ```
use std::collections::HashMap;

use serde::{Deserialize, Serialize, ser::SerializeMap};
use serde_json::{Map, Value};

use super::{config::ClientConfig, error::GqlError};

pub const ACCOUNT_HEADER: &str = "LifeOmic-Account";
pub const USER_HEADER: &str = "LifeOmic-User";
pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const POLICY_HEADER: &str = "LifeOmic-Policy";

static APPLICATION_JSON: &str = "application/json";
static POST: &str = "POST";

/// The headers sent with every request. The header names are fixed by the receiving
/// functions and must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeaders {
    pub account: String,
    pub user: String,
    pub content_type: &'static str,
    /// The serialized [`Policy`](super::config::Policy).
    pub policy: String
}

impl Serialize for EnvelopeHeaders {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(ACCOUNT_HEADER, &self.account)?;
        map.serialize_entry(USER_HEADER, &self.user)?;
        map.serialize_entry(CONTENT_TYPE_HEADER, self.content_type)?;
        map.serialize_entry(POLICY_HEADER, &self.policy)?;
        map.end()
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<'a> {
    pub headers: EnvelopeHeaders,
    pub path: &'a str,
    pub http_method: &'static str,
    pub query_string_parameters: HashMap<String, String>,
    pub body: String
}

#[derive(Serialize, Debug)]
struct GraphQLBody<'a> {
    query: &'a str,
    variables: &'a Map<String, Value>
}

#[derive(Deserialize, Debug)]
pub struct ResponseEnvelope {
    pub body: String
}

/// The GraphQL response carried inside [`ResponseEnvelope::body`].
#[derive(Deserialize, Debug)]
pub struct ResponseBody {
    pub data: Option<Map<String, Value>>,
    pub errors: Option<Vec<ResponseError>>
}

/// Only the message of a GraphQL error is read. Members such as `locations`, `path` or
/// `extensions` are ignored whatever their shape.
#[derive(Deserialize, Debug)]
pub struct ResponseError {
    pub message: String
}

impl<'a> RequestEnvelope<'a> {
    pub fn new(config: &ClientConfig, path: &'a str, query: &str, variables: &Map<String, Value>) -> Result<Self, GqlError> {
        let policy = serde_json::to_string(&config.policy)
            .map_err(GqlError::Encode)?;

        let body = serde_json::to_string(&GraphQLBody { query, variables })
            .map_err(GqlError::Encode)?;

        Ok(Self {
            headers: EnvelopeHeaders {
                account: config.account.clone(),
                user: config.user.clone(),
                content_type: APPLICATION_JSON,
                policy
            },
            path,
            http_method: POST,
            query_string_parameters: HashMap::new(),
            body
        })
    }
}

/// Builds the invocation payload for a GraphQL request routed to `path`.
pub fn encode_request(config: &ClientConfig, path: &str, query: &str, variables: &Map<String, Value>) -> Result<Vec<u8>, GqlError> {
    let envelope = RequestEnvelope::new(config, path, query, variables)?;

    serde_json::to_vec(&envelope)
        .map_err(GqlError::Encode)
}

/// Unwraps both layers of an invocation response.
///
/// If the GraphQL response has any errors the first one wins, even when data is also
/// present. A response with neither data nor errors yields an empty map.
pub fn decode_response(payload: &[u8]) -> Result<Map<String, Value>, GqlError> {
    let envelope: ResponseEnvelope = serde_json::from_slice(payload)
        .map_err(GqlError::MalformedOuterEnvelope)?;

    let body: ResponseBody = serde_json::from_str(&envelope.body)
        .map_err(GqlError::MalformedInnerBody)?;

    if let Some(errors) = body.errors {
        let mut errors = errors.into_iter();

        if let Some(first) = errors.next() {
            let discarded = errors.count();
            if discarded > 0 {
                log::warn!("Discarding {discarded} additional GraphQL errors after: {}", first.message);
            }

            return Err(GqlError::Remote { message: first.message });
        }
    }

    Ok(body.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::config::Policy;

    const MOCK_MUTATION: &str = r#"
mutation MockMutation($var: String!) {
	some_mutation(var: $var) {
		result
	}
}
"#;

    fn variables(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}")
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("test-account", "test-user")
            .with_rule("testRule", true)
    }

    #[test]
    fn encodes_envelope_fields() {
        let raw = encode_request(&config(), "/some/path", MOCK_MUTATION, &variables(json!({"var": "value"}))).unwrap();
        let parsed: Value = serde_json::from_slice(&raw).unwrap();

        let mut keys: Vec<&str> = parsed.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["body", "headers", "httpMethod", "path", "queryStringParameters"]);

        assert_eq!(parsed["path"], "/some/path");
        assert_eq!(parsed["httpMethod"], "POST");
        assert_eq!(parsed["queryStringParameters"], json!({}));

        let headers = &parsed["headers"];
        assert_eq!(headers.as_object().unwrap().len(), 4);
        assert_eq!(headers[ACCOUNT_HEADER], "test-account");
        assert_eq!(headers[USER_HEADER], "test-user");
        assert_eq!(headers[CONTENT_TYPE_HEADER], "application/json");
    }

    #[test]
    fn body_carries_query_and_variables() {
        let vars = variables(json!({
            "var": "value",
            "nested": {"list": [1, 2.5, null, "x"], "flag": false}
        }));

        let raw = encode_request(&config(), "/some/path", MOCK_MUTATION, &vars).unwrap();
        let parsed: Value = serde_json::from_slice(&raw).unwrap();
        let body: Value = serde_json::from_str(parsed["body"].as_str().unwrap()).unwrap();

        assert_eq!(body["query"], MOCK_MUTATION);
        assert_eq!(body["variables"], Value::Object(vars));
    }

    #[test]
    fn body_matches_wire_format() {
        let raw = encode_request(&config(), "/graphql", "{ ping }", &Map::new()).unwrap();
        let parsed: Value = serde_json::from_slice(&raw).unwrap();

        assert_eq!(parsed["body"], r#"{"query":"{ ping }","variables":{}}"#);
    }

    #[test]
    fn policy_header_reflects_rules() {
        let config = ClientConfig::new("account", "user")
            .with_policy(Policy::from_iter([("publishContent", true), ("deleteContent", false)]));

        let raw = encode_request(&config, "/graphql", "{ ping }", &Map::new()).unwrap();
        let parsed: Value = serde_json::from_slice(&raw).unwrap();
        let policy: Policy = serde_json::from_str(parsed["headers"][POLICY_HEADER].as_str().unwrap()).unwrap();

        assert_eq!(policy, config.policy);
    }

    #[test]
    fn decodes_data() {
        let data = decode_response(br#"{ "body": "{ \"data\": { \"result\": true }}"}"#).unwrap();
        assert_eq!(Value::Object(data), json!({"result": true}));
    }

    #[test]
    fn missing_data_is_empty() {
        assert!(decode_response(br#"{"body": "{}"}"#).unwrap().is_empty());
        assert!(decode_response(br#"{"body": "{\"data\": null}"}"#).unwrap().is_empty());
        assert!(decode_response(br#"{"body": "{\"data\": {}, \"errors\": []}"}"#).unwrap().is_empty());
    }

    #[test]
    fn first_error_wins() {
        let payload = br#"{"body": "{\"data\": {\"result\": true}, \"errors\": [{\"message\": \"first\"}, {\"message\": \"second\", \"path\": [\"a\", 0]}]}"}"#;

        match decode_response(payload) {
            Err(GqlError::Remote { message }) => assert_eq!(message, "first"),
            other => panic!("unexpected result {other:?}")
        }
    }

    #[test]
    fn odd_error_members_keep_the_message() {
        let payloads: [&[u8]; 4] = [
            br#"{"body": "{\"errors\": [{\"message\": \"boom\", \"extensions\": \"INTERNAL\"}]}"}"#,
            br#"{"body": "{\"errors\": [{\"message\": \"boom\", \"locations\": [{\"line\": 1}]}]}"}"#,
            br#"{"body": "{\"errors\": [{\"message\": \"boom\", \"path\": [\"a\", 1.5]}]}"}"#,
            br#"{"body": "{\"errors\": [{\"message\": \"boom\"}, {\"message\": \"later\", \"extensions\": 7, \"locations\": null}]}"}"#
        ];

        for payload in payloads {
            match decode_response(payload) {
                Err(GqlError::Remote { message }) => assert_eq!(message, "boom"),
                other => panic!("unexpected result {other:?}")
            }
        }
    }

    #[test]
    fn rejects_malformed_outer_envelope() {
        assert!(matches!(decode_response(b"not json"), Err(GqlError::MalformedOuterEnvelope(_))));
        assert!(matches!(decode_response(br#"{"statusCode": 200}"#), Err(GqlError::MalformedOuterEnvelope(_))));
        assert!(matches!(decode_response(b""), Err(GqlError::MalformedOuterEnvelope(_))));
    }

    #[test]
    fn rejects_malformed_inner_body() {
        assert!(matches!(decode_response(br#"{"body": "<html>"}"#), Err(GqlError::MalformedInnerBody(_))));
        assert!(matches!(decode_response(br#"{"body": "{\"data\": [1, 2]}"}"#), Err(GqlError::MalformedInnerBody(_))));
    }
}
