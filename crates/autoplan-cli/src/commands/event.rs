//! Commitments entered by hand.

use autoplan_core::{CommitmentStore, CommitmentTag, NewCommitment, TimeInterval};
use clap::Subcommand;

use super::{format_interval, parse_instant, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum EventAction {
    /// Add a user-created commitment
    Add {
        /// Event title
        title: String,
        /// Start (RFC 3339)
        #[arg(long)]
        start: String,
        /// End (RFC 3339)
        #[arg(long)]
        end: String,
    },
    /// List every commitment, whatever its origin
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a commitment
    Delete {
        /// Commitment ID
        id: String,
    },
}

pub fn run(ctx: &Context, action: EventAction) -> CliResult {
    let db = ctx.open_db()?;

    match action {
        EventAction::Add { title, start, end } => {
            let interval = TimeInterval::new(parse_instant(&start)?, parse_instant(&end)?)?;
            let created = db.create_commitment(
                &ctx.user,
                NewCommitment::new(interval, title, CommitmentTag::User),
            )?;
            println!("Event created: {}", created.id);
        }
        EventAction::List { json } => {
            let commitments = db.list_user_commitments(&ctx.user, None)?;
            if json {
                return print_json(&commitments);
            }
            if commitments.is_empty() {
                println!("No commitments.");
            }
            for c in &commitments {
                println!(
                    "{}  {:<14}  {}  {}",
                    c.id,
                    c.tag.as_str(),
                    format_interval(&c.interval),
                    c.title
                );
            }
        }
        EventAction::Delete { id } => {
            if !db.delete_commitment(&id)? {
                return Err(format!("commitment not found: {id}").into());
            }
            println!("Event deleted: {id}");
        }
    }
    Ok(())
}
