//! Line-oriented session driver.
//!
//! Each input line is one command. Replies are JSON, one document per
//! reply, followed by any events the command queued. Rejected input is
//! reported on stderr and the session carries on unchanged.

use std::io::{BufRead, Write};

use clap::Args;
use habitscale_core::{
    Config, DemandTree, EntryList, HabitAssessment, LoopStage, ScoreEntry, Session, SessionStep,
    ValidationError,
};
use serde::Serialize;

const HELP: &str = "\
commands:
  habit <name>                      name the habit (step 1)
  short <score> <name> [@stage]     add a short-term entry
  long <score> <name> [@stage]      add a long-term entry
  friction <score> <name> [@stage]  add friction (score must be negative)
  reveal                            remove the present bias (step 2)
  next                              go to the next step
  status                            print the current state
  loop                              explain the habit loop
  demands                           list base demands and their actions
  demand add|remove <demand>        edit the base demands (one word)
  file <demand>                     file the habit under a demand
  unfile <demand> <action>          remove an action from a demand
  reset                             start over
  quit                              leave";

#[derive(Args)]
pub struct SessionArgs {
    /// Print compact JSON (one document per line)
    #[arg(long)]
    compact: bool,
    /// Do not print queued events
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Habit(String),
    Add {
        list: EntryList,
        name: String,
        score: f64,
        stage: Option<LoopStage>,
    },
    Reveal,
    Next,
    Status,
    Loop,
    Demands,
    AddDemand(String),
    RemoveDemand(String),
    File(String),
    Unfile { demand: String, action: String },
    Reset,
    Help,
    Quit,
}

#[derive(Debug)]
enum ParseError {
    Usage(String),
    Invalid(ValidationError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Usage(msg) => f.write_str(msg),
            ParseError::Invalid(err) => write!(f, "{err}"),
        }
    }
}

fn parse_add(list: EntryList, rest: &str) -> Result<SessionCommand, ParseError> {
    let usage = || ParseError::Usage(format!("usage: {list} <score> <name> [@stage]"));
    let (raw_score, rest) = rest.trim().split_once(char::is_whitespace).ok_or_else(usage)?;
    let score = ScoreEntry::parse_score(raw_score).map_err(ParseError::Invalid)?;

    // Only a last word starting with '@' is a stage tag; "boss@work" is
    // part of the name.
    let mut name = rest.trim();
    let mut stage = None;
    let (head, last) = name.rsplit_once(char::is_whitespace).unwrap_or(("", name));
    if let Some(tag) = last.strip_prefix('@') {
        stage = Some(tag.parse::<LoopStage>().map_err(ParseError::Usage)?);
        name = head.trim();
    }

    Ok(SessionCommand::Add {
        list,
        name: name.to_string(),
        score,
        stage,
    })
}

fn one_word(rest: &str, usage: &str) -> Result<String, ParseError> {
    let word = rest.trim();
    if word.is_empty() || word.contains(char::is_whitespace) {
        return Err(ParseError::Usage(format!("usage: {usage}")));
    }
    Ok(word.to_string())
}

fn parse_demand(rest: &str) -> Result<SessionCommand, ParseError> {
    const USAGE: &str = "demand add|remove <demand>";
    let (verb, name) = rest.trim().split_once(char::is_whitespace).unwrap_or((rest.trim(), ""));
    match verb {
        "add" => Ok(SessionCommand::AddDemand(one_word(name, USAGE)?)),
        "remove" => Ok(SessionCommand::RemoveDemand(one_word(name, USAGE)?)),
        _ => Err(ParseError::Usage(format!("usage: {USAGE}"))),
    }
}

fn parse_unfile(rest: &str) -> Result<SessionCommand, ParseError> {
    let usage = || ParseError::Usage("usage: unfile <demand> <action>".to_string());
    let (demand, action) = rest.trim().split_once(char::is_whitespace).ok_or_else(usage)?;
    Ok(SessionCommand::Unfile {
        demand: demand.to_string(),
        action: action.trim().to_string(),
    })
}

fn parse(line: &str) -> Result<SessionCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word.to_ascii_lowercase().as_str() {
        "habit" => Ok(SessionCommand::Habit(rest.trim().to_string())),
        "short" => parse_add(EntryList::ShortTerm, rest),
        "long" => parse_add(EntryList::LongTerm, rest),
        "friction" => parse_add(EntryList::Friction, rest),
        "reveal" => Ok(SessionCommand::Reveal),
        "next" => Ok(SessionCommand::Next),
        "status" => Ok(SessionCommand::Status),
        "loop" => Ok(SessionCommand::Loop),
        "demands" => Ok(SessionCommand::Demands),
        "demand" => parse_demand(rest),
        "file" => Ok(SessionCommand::File(one_word(rest, "file <demand>")?)),
        "unfile" => parse_unfile(rest),
        "reset" => Ok(SessionCommand::Reset),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(ParseError::Usage(format!(
            "unknown command: {other} (try 'help')"
        ))),
    }
}

#[derive(Serialize)]
struct StageInfo {
    stage: LoopStage,
    label: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct LoopReport {
    stages: Vec<StageInfo>,
    assessment: HabitAssessment,
}

#[derive(Serialize)]
struct ActionReport<'a> {
    name: &'a str,
    short_value: f64,
    long_value: f64,
    cp_value: f64,
}

#[derive(Serialize)]
struct DemandReport<'a> {
    demand: &'a str,
    actions: Vec<ActionReport<'a>>,
}

fn demand_reports(tree: &DemandTree) -> Vec<DemandReport<'_>> {
    tree.demands()
        .iter()
        .map(|demand| DemandReport {
            demand: &demand.name,
            actions: demand
                .ranked_actions()
                .into_iter()
                .map(|a| ActionReport {
                    name: &a.name,
                    short_value: a.short_value,
                    long_value: a.long_value,
                    cp_value: a.cp_value(),
                })
                .collect(),
        })
        .collect()
}

struct Driver<W: Write> {
    session: Session,
    tree: DemandTree,
    out: W,
    pretty: bool,
    show_events: bool,
}

impl<W: Write> Driver<W> {
    fn emit<T: Serialize>(&mut self, value: &T) -> Result<(), Box<dyn std::error::Error>> {
        writeln!(self.out, "{}", super::to_json(value, self.pretty)?)?;
        Ok(())
    }

    fn emit_snapshot(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = self.session.snapshot();
        self.emit(&snapshot)
    }

    fn emit_demands(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let json = super::to_json(&demand_reports(&self.tree), self.pretty)?;
        writeln!(self.out, "{json}")?;
        Ok(())
    }

    fn flush_events(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let events = self.session.take_events();
        if self.show_events {
            for event in &events {
                self.emit(event)?;
            }
        }
        Ok(())
    }

    /// Returns `false` once the user asked to leave.
    fn execute(&mut self, command: SessionCommand) -> Result<bool, Box<dyn std::error::Error>> {
        match command {
            SessionCommand::Habit(name) => match self.session.set_habit(&name) {
                Ok(_) => self.emit_snapshot()?,
                Err(e) => eprintln!("error: {e}"),
            },
            SessionCommand::Add {
                list,
                name,
                score,
                stage,
            } => {
                if self.session.step() == SessionStep::NameInput {
                    eprintln!("error: name the habit first");
                    return Ok(true);
                }
                let result = match list {
                    EntryList::ShortTerm => self.session.add_short_term(&name, score, stage),
                    EntryList::LongTerm => self.session.add_long_term(&name, score, stage),
                    EntryList::Friction => self.session.add_friction(&name, score, stage),
                };
                match result {
                    Ok(reading) => self.emit(&reading)?,
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            SessionCommand::Reveal => {
                if self.session.reveal_truth().is_none() {
                    eprintln!("nothing to reveal at step {}", self.session.step());
                }
                let reading = self.session.reading();
                self.emit(&reading)?;
            }
            SessionCommand::Next => {
                if self.session.advance().is_none() {
                    eprintln!("cannot leave step {} yet", self.session.step());
                }
                self.emit_snapshot()?;
            }
            SessionCommand::Status => self.emit_snapshot()?,
            SessionCommand::Loop => {
                let report = LoopReport {
                    stages: LoopStage::ALL
                        .iter()
                        .map(|&stage| StageInfo {
                            stage,
                            label: stage.label(),
                            description: stage.description(),
                        })
                        .collect(),
                    assessment: self.session.assessment(),
                };
                self.emit(&report)?;
            }
            SessionCommand::Demands => self.emit_demands()?,
            SessionCommand::AddDemand(name) => match self.tree.add_demand(&name) {
                Ok(_) => self.emit_demands()?,
                Err(e) => eprintln!("error: {e}"),
            },
            SessionCommand::RemoveDemand(name) => match self.tree.remove_demand(&name) {
                Ok(_) => self.emit_demands()?,
                Err(e) => eprintln!("error: {e}"),
            },
            SessionCommand::File(demand) => {
                match self.tree.record_session(&demand, &self.session) {
                    Ok(action) => {
                        tracing::info!(demand = %demand, action = %action.name, "habit filed");
                        self.emit_demands()?;
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            SessionCommand::Unfile { demand, action } => {
                match self.tree.remove_action(&demand, &action) {
                    Ok(_) => self.emit_demands()?,
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            SessionCommand::Reset => {
                self.session.reset();
                self.emit_snapshot()?;
            }
            SessionCommand::Help => eprintln!("{HELP}"),
            SessionCommand::Quit => return Ok(false),
        }
        self.flush_events()?;
        Ok(true)
    }
}

fn drive<R: BufRead, W: Write>(
    input: R,
    out: W,
    session: Session,
    tree: DemandTree,
    pretty: bool,
    show_events: bool,
) -> Result<(Session, DemandTree), Box<dyn std::error::Error>> {
    let mut driver = Driver {
        session,
        tree,
        out,
        pretty,
        show_events,
    };

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let command = match parse(&line) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "rejected session command");
                eprintln!("error: {e}");
                continue;
            }
        };
        tracing::debug!(?command, "session command");
        if !driver.execute(command)? {
            break;
        }
    }
    driver.out.flush()?;
    Ok((driver.session, driver.tree))
}

pub fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let session = Session::new();
    let tree = if config.demands.seed_base_demands {
        DemandTree::seeded()
    } else {
        DemandTree::new()
    };
    tracing::info!(session = %session.id(), "session started");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    drive(
        stdin.lock(),
        stdout.lock(),
        session,
        tree,
        config.output.pretty_json && !args.compact,
        config.output.show_events && !args.quiet,
    )?;
    Ok(())
}
