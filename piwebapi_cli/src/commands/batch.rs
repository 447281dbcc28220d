use anyhow::Result;
use clap::Args;
use piwebapi::{FaultSink, Method, PointRef, Session, WebApi};

use crate::commands::{as_params, parse_key_val};
use crate::output::{print_batch_table, print_json, OutputFormat};

#[derive(Args)]
pub struct BatchArgs {
    /// Point as webid=name (repeatable)
    #[arg(long = "point", value_parser = parse_key_val, required = true)]
    pub points: Vec<(String, String)>,

    /// Stream action to run for every point (value, recorded, interpolated, ...)
    #[arg(long, default_value = "value")]
    pub action: String,

    /// Query parameter as key=value applied to every sub-request (repeatable)
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

pub fn build_points(pairs: &[(String, String)]) -> Vec<PointRef> {
    pairs
        .iter()
        .map(|(web_id, name)| PointRef::new(web_id, name))
        .collect()
}

pub async fn run<S: Session, K: FaultSink>(
    args: &BatchArgs,
    api: &WebApi<S, K>,
    format: &OutputFormat,
) -> Result<()> {
    let points = build_points(&args.points);
    let resp = api
        .batch(Method::GET, &points, &args.action, &as_params(&args.params))
        .await?;
    let body: serde_json::Value = resp.json()?;

    match format {
        OutputFormat::Json => print_json(&body),
        OutputFormat::Table => print_batch_table(&body),
    }
    Ok(())
}
