//! Scheduler target resolution command
//!
//! Usage: wzhosts targets [ID...]

use clap::Args;
use wzhosts_store::{select_api_targets, HostRepository};

use super::hosts::print_host_line;

#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Requested host ids; every host when empty
    pub ids: Vec<String>,
}

pub fn execute(repo: &HostRepository, args: TargetsArgs) -> Result<(), Box<dyn std::error::Error>> {
    match select_api_targets(repo, &args.ids) {
        Ok(hosts) => {
            for host in &hosts {
                print_host_line(host);
            }
            Ok(())
        }
        Err(e) => match e.code() {
            Some(code) => Err(format!("{} (code {})", e, code).into()),
            None => Err(e.into()),
        },
    }
}
