use thiserror::Error;

/// Errors produced while sending a GraphQL request through a function invocation.
///
/// Each variant corresponds to one stage of the request pipeline, so a failure always
/// tells you how far the call got:
///
/// - `InvalidAddress`: the address could not be split, nothing was sent.
/// - `Encode`: the request envelope could not be serialized, nothing was sent.
/// - `Invocation`: the invoker itself failed. The message is passed through unchanged.
/// - `MalformedOuterEnvelope` / `MalformedInnerBody`: the function answered with
///   something that is not the expected response envelope.
/// - `Remote`: the backend ran the request and reported GraphQL errors. Only the first
///   error's message is kept.
#[derive(Debug, Error)]
pub enum GqlError {
    #[error("Invalid address {0:?}, expected <function>/<path>")]
    InvalidAddress(String),

    #[error("Error serializing request envelope")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Invocation(anyhow::Error),

    #[error("Error deserializing response envelope")]
    MalformedOuterEnvelope(#[source] serde_json::Error),

    #[error("Error deserializing GraphQL response body")]
    MalformedInnerBody(#[source] serde_json::Error),

    #[error("{message}")]
    Remote { message: String },
}
