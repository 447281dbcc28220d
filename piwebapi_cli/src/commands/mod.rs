//! CLI subcommand implementations.

pub mod batch;
pub mod info;
pub mod request;

/// Parses a `key=value` pair given on the command line.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Borrows owned pairs in the shape the client takes.
pub fn as_params(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}
