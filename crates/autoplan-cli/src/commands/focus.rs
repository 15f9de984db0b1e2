use clap::Subcommand;

use super::{format_interval, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum FocusAction {
    /// List focus blocks from today on without reserving them
    Suggest {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reserve focus time at the start of every focus block
    Protect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(ctx: &Context, action: FocusAction) -> CliResult {
    let planner = ctx.planner()?;
    let now = ctx.now()?;

    match action {
        FocusAction::Suggest { json } => {
            let blocks = planner.list_focus_suggestions_at(&ctx.user, now)?;
            if json {
                return print_json(&blocks);
            }
            if blocks.is_empty() {
                println!("No focus blocks in the next week.");
            }
            for block in &blocks {
                println!("{}", format_interval(block));
            }
        }
        FocusAction::Protect { json } => {
            let created = planner.protect_focus_time_at(&ctx.user, now)?;
            if json {
                return print_json(&created);
            }
            println!("Protected {} focus block(s)", created.len());
            for c in &created {
                println!("  {}", format_interval(&c.interval));
            }
        }
    }
    Ok(())
}
