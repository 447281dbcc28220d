use anyhow::{Context, Result};
use clap::Args;
use piwebapi::{ErrorPolicy, FaultSink, Session, WebApi};

use crate::commands::{as_params, parse_key_val};
use crate::output::print_body;

#[derive(Args)]
pub struct RequestArgs {
    /// Resource path relative to the root URL, or an absolute URL
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

#[derive(Args)]
pub struct PostArgs {
    /// Resource path relative to the root URL, or an absolute URL
    pub path: String,

    /// JSON body to send
    #[arg(long)]
    pub body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

pub async fn get<S: Session, K: FaultSink>(
    args: &RequestArgs,
    api: &WebApi<S, K>,
    policy: ErrorPolicy,
) -> Result<()> {
    let resp = api.get(&args.path, &as_params(&args.params), policy).await?;
    print_body(&resp.response);
    Ok(())
}

pub async fn put<S: Session, K: FaultSink>(
    args: &RequestArgs,
    api: &WebApi<S, K>,
    policy: ErrorPolicy,
) -> Result<()> {
    let resp = api.put(&args.path, &as_params(&args.params), policy).await?;
    print_body(&resp.response);
    Ok(())
}

pub async fn post<S: Session, K: FaultSink>(
    args: &PostArgs,
    api: &WebApi<S, K>,
    policy: ErrorPolicy,
) -> Result<()> {
    let body = args
        .body
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--body is not valid JSON")?;
    let resp = api
        .post(&args.path, &as_params(&args.params), body.as_ref(), policy)
        .await?;
    eprintln!("{} {}", resp.status(), resp.response.reason);
    print_body(&resp.response);
    Ok(())
}
