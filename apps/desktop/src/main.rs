use anyhow::Result;
use clap::Parser;
use client_core::{HttpTransport, ProjectClient, SortPreference};
use shared::protocol::CreateProjectRequest;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Create a project with this name after the initial fetch.
    #[arg(long)]
    create: Option<String>,
    /// newest, oldest, or alphabetical.
    #[arg(long, default_value = "newest")]
    sort_by: String,
}

fn parse_sort(value: &str) -> SortPreference {
    if value.eq_ignore_ascii_case("oldest") {
        SortPreference::Oldest
    } else if value.eq_ignore_ascii_case("alphabetical") {
        SortPreference::Alphabetical
    } else {
        SortPreference::Newest
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = ProjectClient::new(HttpTransport::new(args.server_url));
    client.set_sort_preference(parse_sort(&args.sort_by)).await;

    if let Err(err) = client.refresh().await {
        tracing::warn!(%err, "project fetch failed; showing cached state");
    }

    if let Some(name) = args.create {
        match client.create(CreateProjectRequest { name }).await {
            Ok(()) => println!("project created"),
            Err(err) => eprintln!("create failed: {err}"),
        }
    }

    let snapshot = client.snapshot().await;
    println!(
        "fetch: {:?}  submit: {:?}  ({} projects)",
        snapshot.fetch_status,
        snapshot.submit_status,
        snapshot.projects.len()
    );
    if let Some(message) = &snapshot.fetch_error {
        println!("fetch error: {message}");
    }
    if let Some(message) = &snapshot.submit_error {
        println!("submit error: {message}");
    }
    for project in &snapshot.projects {
        println!(
            "{}  {}  (admin: {}, members: {})",
            project.project_id,
            project.name,
            project.created_by.username,
            project.members.len()
        );
    }

    Ok(())
}
