//! Doctor command implementation.
//!
//! Read-only health sweep over one or all provisioning domains.

use anyhow::Result;
use clap::Args;

use crate::context::ExecutionContext;
use crate::domains::registry_for;
use crate::engine::{doctor, Domain};
use crate::output::Output;

const ALL_DOMAINS: [Domain; 3] = [Domain::Install, Domain::Pull, Domain::Create];

#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Limit the report to one domain
    #[arg(long, value_enum)]
    pub domain: Option<Domain>,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DoctorArgs, ctx: &ExecutionContext) -> Result<()> {
    if args.json {
        let value = match args.domain {
            Some(domain) => domain_report(domain, ctx)?,
            None => {
                let mut root = serde_json::Map::new();
                for domain in ALL_DOMAINS {
                    root.insert(domain.to_string(), domain_report(domain, ctx)?);
                }
                serde_json::Value::Object(root)
            }
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let domains = match args.domain {
        Some(domain) => vec![domain],
        None => ALL_DOMAINS.to_vec(),
    };
    for (i, domain) in domains.into_iter().enumerate() {
        if i > 0 {
            Output::blank();
        }
        Output::subheader(format!("{} targets:", domain.title()));
        let (registry, ids) = registry_for(domain);
        let entries = doctor::examine(&registry, &ids, ctx);
        doctor::print_human(&entries);
    }
    Ok(())
}

fn domain_report(domain: Domain, ctx: &ExecutionContext) -> Result<serde_json::Value> {
    let (registry, ids) = registry_for(domain);
    let entries = doctor::examine(&registry, &ids, ctx);
    doctor::to_json(&entries)
}
