use clap::Subcommand;

use super::{format_interval, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Place pending tasks into free time
    Auto {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(ctx: &Context, action: ScheduleAction) -> CliResult {
    match action {
        ScheduleAction::Auto { json } => {
            let report = ctx.planner()?.schedule_report_at(&ctx.user, ctx.now()?)?;
            if json {
                return print_json(&report);
            }
            println!("Scheduled {} task(s)", report.placed.len());
            for c in &report.placed {
                println!("  {}  {}", format_interval(&c.interval), c.title);
            }
            if !report.unscheduled.is_empty() {
                println!("No slot found for {} task(s):", report.unscheduled.len());
                for id in &report.unscheduled {
                    println!("  {id}");
                }
            }
        }
    }
    Ok(())
}
