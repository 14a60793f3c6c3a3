use clap::Args;
use habitscale_core::{BalanceEngine, BalanceReading, Config, ScoreEntry, SessionStep, Tilt};
use serde::Serialize;

#[derive(Args)]
pub struct AngleArgs {
    /// Short-term total (pull toward keeping the habit)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_total)]
    short: f64,
    /// Long-term total (negative values are costs)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_total)]
    long: f64,
    /// Weigh long-term costs at full strength
    #[arg(long)]
    unbiased: bool,
    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Session step (1-5)
    #[arg(long, value_parser = parse_step)]
    step: SessionStep,
    /// Short-term total
    #[arg(long, allow_negative_numbers = true, value_parser = parse_total)]
    short: f64,
    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Serialize)]
struct CheckReport {
    step: u8,
    short_total: f64,
    success: bool,
}

fn parse_total(raw: &str) -> Result<f64, String> {
    ScoreEntry::parse_score(raw).map_err(|e| e.to_string())
}

fn parse_step(raw: &str) -> Result<SessionStep, String> {
    let n: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a step number"))?;
    SessionStep::try_from(n)
}

pub fn run_angle(args: AngleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let is_biased = !args.unbiased;
    let angle = BalanceEngine::compute_angle(args.short, args.long, is_biased);
    let reading = BalanceReading {
        short_total: args.short,
        long_total: args.long,
        is_biased,
        angle,
        tilt: Tilt::from_angle(angle),
    };
    let pretty = config.output.pretty_json && !args.compact;
    println!("{}", super::to_json(&reading, pretty)?);
    Ok(())
}

pub fn run_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let report = CheckReport {
        step: args.step.as_u8(),
        short_total: args.short,
        success: BalanceEngine::check_success(args.step, args.short),
    };
    let pretty = config.output.pretty_json && !args.compact;
    println!("{}", super::to_json(&report, pretty)?);
    Ok(())
}
