//! JSON codec for the SCM plugin protocol.
//!
//! Both protocol revisions share the same message shapes; version 2.0 only
//! adds the capability and webhook messages. Encoders produce request bodies
//! with a fixed key order, decoders validate responses strictly and report
//! the first rule broken as a [`DecodeError`].

mod decode;
mod encode;
mod error;
mod node;
mod timestamp;

pub use self::decode::{
    decode_capabilities, decode_check_result, decode_configuration, decode_latest_revision,
    decode_revisions_since, decode_should_update, decode_validation, decode_view,
};
pub use self::encode::{
    SECRET_PLACEHOLDER_PREFIX, WebhookEvent, encode_checkout_request,
    encode_configuration_request, encode_latest_revision_request, encode_revisions_since_request,
    encode_should_update_request,
};
pub use self::error::{Constraint, DecodeError, EncodeError, PayloadKind, Shape};
pub use self::timestamp::{TIMESTAMP_PATTERN, format_timestamp, parse_timestamp};

#[cfg(test)]
mod tests;
