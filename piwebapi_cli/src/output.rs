use piwebapi::RawResponse;
use serde_json::{Map, Value};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Point")]
    point: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Link")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
}

fn build_batch_rows(body: &Value) -> Vec<BatchRow> {
    let Some(entries) = body.as_object() else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|(point, entry)| {
            let content = entry.get("Content");
            BatchRow {
                point: point.clone(),
                status: entry
                    .get("Status")
                    .map(compact)
                    .unwrap_or_default(),
                timestamp: content
                    .and_then(|c| c.get("Timestamp"))
                    .map(compact)
                    .unwrap_or_default(),
                value: content
                    .map(|c| compact(c.get("Value").unwrap_or(c)))
                    .unwrap_or_default(),
            }
        })
        .collect()
}

fn build_link_rows(links: &Map<String, Value>) -> Vec<LinkRow> {
    links
        .iter()
        .map(|(name, url)| LinkRow {
            name: name.clone(),
            url: compact(url),
        })
        .collect()
}

/// Renders a JSON value on one line, without quotes around plain strings.
fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn print_batch_table(body: &Value) {
    println!("{}", Table::new(build_batch_rows(body)));
}

pub fn print_links_table(links: &Map<String, Value>) {
    println!("{}", Table::new(build_link_rows(links)));
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Pretty-prints a JSON body, or the raw text when it is not JSON.
pub fn print_body(response: &RawResponse) {
    match response.json::<Value>() {
        Ok(body) => print_json(&body),
        Err(_) if response.body.is_empty() => {}
        Err(_) => println!("{}", response.text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_rows_pick_status_timestamp_and_value() {
        let body = json!({
            "sinusoid": {
                "Status": 200,
                "Content": {"Timestamp": "2017-02-01T14:00:00Z", "Value": 42.5}
            },
            "cdt158": {
                "Status": 404,
                "Content": {"Errors": ["not found"]}
            }
        });
        let rows = build_batch_rows(&body);
        assert_eq!(rows.len(), 2);

        let sinusoid = rows.iter().find(|r| r.point == "sinusoid").unwrap();
        assert_eq!(sinusoid.status, "200");
        assert_eq!(sinusoid.timestamp, "2017-02-01T14:00:00Z");
        assert_eq!(sinusoid.value, "42.5");

        let cdt = rows.iter().find(|r| r.point == "cdt158").unwrap();
        assert_eq!(cdt.status, "404");
        assert_eq!(cdt.timestamp, "");
        assert_eq!(cdt.value, r#"{"Errors":["not found"]}"#);
    }

    #[test]
    fn batch_rows_for_non_object_body_are_empty() {
        assert!(build_batch_rows(&json!([1, 2])).is_empty());
    }

    #[test]
    fn batch_table_has_headers() {
        let body = json!({"sinusoid": {"Status": 200, "Content": {"Value": 1}}});
        let table = Table::new(build_batch_rows(&body)).to_string();
        let header = table.lines().nth(1).unwrap_or_default();
        assert!(header.contains("Point"));
        assert!(header.contains("Value"));
    }

    #[test]
    fn link_rows_unquote_urls() {
        let links = json!({"Self": "https://pisrv01/piwebapi/"});
        let rows = build_link_rows(links.as_object().unwrap());
        assert_eq!(rows[0].name, "Self");
        assert_eq!(rows[0].url, "https://pisrv01/piwebapi/");
    }
}
