//! Host CRUD commands
//!
//! Usage:
//! - wzhosts list
//! - wzhosts get <ID>
//! - wzhosts add --url <URL> --user <USER> --password <PASSWORD> [--port <PORT>] [--id <ID>]
//! - wzhosts update <ID> --url <URL> --user <USER> --password <PASSWORD> [--port <PORT>]
//! - wzhosts delete <ID>

use clap::Args;
use wzhosts_core::{HostRecord, NewHost};
use wzhosts_store::HostRepository;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct IdArgs {
    /// Host id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Scheme and host, e.g. https://localhost
    #[arg(long)]
    pub url: String,

    #[arg(long, default_value_t = 55000)]
    pub port: u16,

    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub password: String,
}

impl ConnectionArgs {
    fn into_new_host(self) -> NewHost {
        NewHost::new(self.url, self.port, self.user, self.password)
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Host id; derived from the current time when omitted
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Host id
    pub id: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// One line per host: id, endpoint and user
pub fn print_host_line(host: &HostRecord) {
    println!("{}\t{}:{}\t{}", host.id, host.url, host.port, host.username);
}

pub fn list(repo: &HostRepository) -> CommandResult {
    for host in repo.list()? {
        print_host_line(&host);
    }
    Ok(())
}

pub fn get(repo: &HostRepository, args: IdArgs) -> CommandResult {
    let host = repo.get_by_id(&args.id)?;
    println!("id: {}", host.id);
    println!("url: {}", host.url);
    println!("port: {}", host.port);
    println!("user: {}", host.username);
    Ok(())
}

pub fn add(repo: &HostRepository, args: AddArgs) -> CommandResult {
    let mut host = args.connection.into_new_host();
    host.id = args.id;
    let id = repo.add(host)?;
    println!("{}", id);
    Ok(())
}

pub fn update(repo: &HostRepository, args: UpdateArgs) -> CommandResult {
    let updated = repo.update(&args.id, &args.connection.into_new_host())?;
    print_host_line(&updated);
    Ok(())
}

pub fn delete(repo: &HostRepository, args: IdArgs) -> CommandResult {
    repo.delete(&args.id)?;
    println!("Deleted {}", args.id);
    Ok(())
}
