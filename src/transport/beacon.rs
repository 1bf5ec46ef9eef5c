use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::record::TelemetryRecord;

/// Characters `encodeURIComponent` leaves untouched, so collectors see the
/// exact encoding a page script would have produced.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Cache-busting parameter appended to every beacon.
pub const FRESHNESS_PARAM: &str = "_t";

/// One serialized delivery. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconRequest {
    endpoint: String,
    query: String,
}

impl BeaconRequest {
    pub fn new(endpoint: &str, record: &TelemetryRecord, now_millis: u64) -> Self {
        let mut pairs: Vec<String> = record
            .iter()
            .map(|(name, value)| format!("{}={}", name, encode_component(&value.to_string())))
            .collect();
        pairs.push(format!("{}={}", FRESHNESS_PARAM, to_base36(now_millis)));

        Self {
            endpoint: endpoint.to_string(),
            query: pairs.join("&"),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn url(&self) -> String {
        let sep = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, sep, self.query)
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Lowercase base-36, the shortest printable form of a millisecond clock.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
