use piwebapi::{FaultSink, Session, WebApi};

use crate::output::{print_json, print_links_table, OutputFormat};

pub fn run<S: Session, K: FaultSink>(api: &WebApi<S, K>, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(api.root()),
        OutputFormat::Table => match api.links() {
            Some(links) => print_links_table(links),
            None => eprintln!("Root document at {} has no links", api.url()),
        },
    }
}
