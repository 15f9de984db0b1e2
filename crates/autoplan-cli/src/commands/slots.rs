use chrono::NaiveDate;
use clap::Args;

use super::{format_interval, print_json, CliResult, Context};

#[derive(Args)]
pub struct SlotsArgs {
    /// Day to inspect (YYYY-MM-DD, default: today in work-day time)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(ctx: &Context, args: SlotsArgs) -> CliResult {
    let planner = ctx.planner()?;
    let date = match args.date {
        Some(date) => date,
        None => planner.work_hours().local_date(ctx.now()?),
    };
    let slots = planner.free_slots_on(&ctx.user, date)?;

    if args.json {
        return print_json(&slots);
    }
    if slots.is_empty() {
        println!("No free slots on {date}.");
    }
    for slot in &slots {
        println!("{}", format_interval(slot));
    }
    Ok(())
}
