use std::fs;
use std::io::Write;

use anyhow::Result;
use clap::Parser;

mod client;
mod config;
mod error;
mod models;
mod query;
mod report;

#[cfg(test)]
mod client_tests;
#[cfg(test)]
mod report_tests;

use crate::client::VertecClient;
use crate::config::load_config;
use crate::models::Record;

#[derive(Parser)]
#[command(name = "vertec-timesheets")]
#[command(about = "Exports the logged-in user's Vertec timesheets as JSON")]
#[command(version)]
struct Args {
    /// Write the JSON output to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Print the per-user gap report instead of JSON
    #[arg(short = 'r', long = "report")]
    report: bool,

    /// Quiet mode - suppress progress messages
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Resolve credentials from environment, stored config or prompts
    let config = load_config()?;
    let base_url = config.base_url.clone();

    let client = VertecClient::new(config);

    if !args.quiet {
        eprintln!("Logging in to {base_url}...");
    }
    let session = client.login()?;

    if !args.quiet {
        eprintln!("Fetching team members...");
    }
    let members = client.team_members(&session)?;

    let mut entries: Vec<Record> = Vec::new();
    let mut sections: Vec<(String, Vec<Record>)> = Vec::new();

    for member in &members {
        if member["aktiv"].as_str() != Some("1") {
            continue;
        }
        let name = member["name"].as_str().unwrap_or("?");
        let objid = match member["objid"].as_str() {
            Some(objid) => objid,
            None => {
                log::warn!("skipping user '{name}' without an object id");
                continue;
            }
        };

        if !args.quiet {
            eprintln!("Fetching timesheets for {name} ({objid})...");
        }
        let mut rows = client.timesheets(&session, objid)?;
        rows.sort_by(|a, b| {
            a["datum"]
                .as_str()
                .unwrap_or("")
                .cmp(b["datum"].as_str().unwrap_or(""))
        });

        if args.report {
            sections.push((format!("{name} ({objid})"), rows));
        } else {
            entries.extend(rows);
        }
    }

    if args.report {
        for (heading, rows) in &sections {
            println!("\n### {heading}");
            print!("{}", report::render_gap_report(rows));
        }
        return Ok(());
    }

    // Pass the entries through unmodified as a single JSON array
    let json = serde_json::to_string_pretty(&entries)?;
    match &args.output {
        Some(path) => {
            fs::write(path, &json)?;
            if !args.quiet {
                eprintln!("Wrote {} entries to {path}", entries.len());
            }
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
