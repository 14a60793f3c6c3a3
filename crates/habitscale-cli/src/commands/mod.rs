pub mod balance;
pub mod config;
pub mod session;

use serde::Serialize;

/// Serialize `value` as a single JSON document, pretty or compact.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
