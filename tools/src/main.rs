//! plan-runner: headless backlog planner.
//!
//! Usage:
//!   plan-runner --xs 5 --s 8 --m 4 --l 2 --man-weeks 40 --sprint-weeks 2
//!   plan-runner --xs 5 --s 8 --team --db roster.db --start 2024-03-04
//!   plan-runner --db roster.db --ipc-mode

use anyhow::Result;
use chrono::NaiveDate;
use planner_core::{
    calendar::add_weeks,
    capacity::CapacityProfile,
    config::PlanningConfig,
    effort::FeatureCounts,
    engine::{PlanReport, PlanningEngine},
    member::{HolidayPeriod, Role, TeamMember},
    member_capacity::PlanningWindow,
    store::RosterStore,
    types::Weeks,
};
use std::env;
use std::io::{self, BufRead, Write};

const DEFAULT_SPRINT_WEEKS: Weeks = 2.0;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    /// Man-weeks mode when `man_weeks` is set, otherwise the stored roster.
    Estimate {
        #[serde(default)]
        counts: FeatureCounts,
        man_weeks: Option<Weeks>,
        sprint_weeks: Option<Weeks>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    ListMembers,
    AddMember {
        name: String,
        sprint_weeks: Option<Weeks>,
        role: Option<Role>,
        base_capacity_per_sprint: Option<Weeks>,
        company_tenure_months: Option<u32>,
        team_tenure_months: Option<u32>,
        #[serde(default)]
        is_upskilling: bool,
        #[serde(default)]
        holidays: Vec<HolidayPeriod>,
    },
    UpdateMember {
        member_id: String,
        member: TeamMember,
    },
    DeleteMember {
        member_id: String,
    },
    Insights {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let counts = FeatureCounts::new(
        parse_arg(&args, "--xs", 0u32),
        parse_arg(&args, "--s", 0u32),
        parse_arg(&args, "--m", 0u32),
        parse_arg(&args, "--l", 0u32),
    );
    let sprint_weeks = parse_arg(&args, "--sprint-weeks", DEFAULT_SPRINT_WEEKS);
    let man_weeks: Option<Weeks> = parse_opt(&args, "--man-weeks");
    let start: Option<NaiveDate> = parse_opt(&args, "--start");
    let end: Option<NaiveDate> = parse_opt(&args, "--end");
    let team_mode = args.iter().any(|a| a == "--team");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = match PlanningConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{e}; falling back to built-in tables");
            PlanningConfig::default()
        }
    };
    let engine = PlanningEngine::new(config);

    let store = if db == ":memory:" {
        RosterStore::in_memory()?
    } else {
        RosterStore::open(db)?
    };
    store.migrate()?;

    if ipc_mode {
        return run_ipc_loop(&engine, &store);
    }

    println!("Backlog planner: plan-runner");
    println!(
        "  features:  {} (XS {} / S {} / M {} / L {})",
        counts.total_features(),
        counts.xs,
        counts.s,
        counts.m,
        counts.l
    );
    println!("  sprint:    {sprint_weeks} weeks");
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();
    if counts.is_empty() {
        log::warn!("no features given; pass --xs/--s/--m/--l");
    }

    let report = match (man_weeks, team_mode) {
        (Some(mw), false) => {
            let profile = CapacityProfile::new(mw, sprint_weeks)?;
            engine.plan_with_profile(&counts, &profile, start)?
        }
        _ => {
            let members = store.list_members()?;
            if members.is_empty() {
                anyhow::bail!("roster in {db} is empty; pass --man-weeks or add members first");
            }
            let window = planning_window(&engine, start, end)?;
            engine.plan_with_team(&counts, &members, sprint_weeks, &window, start)?
        }
    };
    print_summary(&report);
    Ok(())
}

fn run_ipc_loop(engine: &PlanningEngine, store: &RosterStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e)?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_command(engine, store, cmd) {
            Ok(response) => writeln!(stdout, "{}", serde_json::to_string(&response)?)?,
            Err(e) => {
                log::warn!("ipc command rejected: {e}");
                write_error(&mut stdout, &e)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    engine: &PlanningEngine,
    store: &RosterStore,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    let response = match cmd {
        IpcCommand::Estimate {
            counts,
            man_weeks,
            sprint_weeks,
            start,
            end,
        } => {
            let sprint_weeks = sprint_weeks.unwrap_or(DEFAULT_SPRINT_WEEKS);
            let report = match man_weeks {
                Some(mw) => {
                    let profile = CapacityProfile::new(mw, sprint_weeks)?;
                    engine.plan_with_profile(&counts, &profile, start)?
                }
                None => {
                    let members = store.list_members()?;
                    let window = planning_window(engine, start, end)?;
                    engine.plan_with_team(&counts, &members, sprint_weeks, &window, start)?
                }
            };
            serde_json::to_value(report)?
        }
        IpcCommand::ListMembers => serde_json::to_value(store.list_members()?)?,
        IpcCommand::AddMember {
            name,
            sprint_weeks,
            role,
            base_capacity_per_sprint,
            company_tenure_months,
            team_tenure_months,
            is_upskilling,
            holidays,
        } => {
            let mut member = TeamMember::new(name, sprint_weeks.unwrap_or(DEFAULT_SPRINT_WEEKS))
                .upskilling(is_upskilling);
            if let Some(role) = role {
                member = member.with_role(role);
            }
            if let Some(base) = base_capacity_per_sprint {
                member = member.with_base_capacity(base);
            }
            if let Some(months) = company_tenure_months {
                member.company_tenure_months = months;
            }
            if let Some(months) = team_tenure_months {
                member.team_tenure_months = months;
            }
            member.holidays = holidays;
            store.add_member(&member)?;
            serde_json::to_value(store.list_members()?)?
        }
        IpcCommand::UpdateMember { member_id, member } => {
            store.update_member(&member_id, &member)?;
            serde_json::to_value(store.list_members()?)?
        }
        IpcCommand::DeleteMember { member_id } => {
            store.delete_member(&member_id)?;
            serde_json::to_value(store.list_members()?)?
        }
        IpcCommand::Insights { start, end } => {
            let members = store.list_members()?;
            let window = planning_window(engine, start, end)?;
            serde_json::to_value(engine.insights(&members, &window))?
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(response)
}

/// Window over which holiday impact is measured: `start..end`, defaulting to
/// one planning quarter from the start date.
fn planning_window(
    engine: &PlanningEngine,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<PlanningWindow> {
    let start = PlanningEngine::start_or_today(start);
    let end = end.unwrap_or_else(|| add_weeks(start, engine.config().weeks_per_quarter));
    Ok(PlanningWindow::new(start, end)?)
}

fn write_error(out: &mut impl Write, e: &dyn std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": e.to_string() });
    writeln!(out, "{}", err_json)?;
    out.flush()?;
    Ok(())
}

fn print_summary(report: &PlanReport) {
    let estimate = &report.estimate;
    println!("=== PLAN SUMMARY ===");
    println!("  total effort:     {:.1} sprint-points", report.total_effort);
    for share in &report.effort_breakdown {
        println!("    {:<3} x{:<4} {:>7.1}", share.size.label(), share.count, share.effort);
    }
    println!("  per sprint:       {:.2}", report.capacity_per_sprint);
    println!("  per quarter:      {:.2}", report.capacity_per_quarter);
    println!("  sprints needed:   {}", estimate.total_sprints);
    println!("  weeks needed:     {:.1}", estimate.total_weeks);
    println!("  start:            {}", estimate.start_date);
    println!("  completion:       {}", estimate.completion_date);

    println!();
    println!("=== QUARTERLY BREAKDOWN ===");
    if estimate.quarterly_breakdown.is_empty() {
        println!("  (Nothing to schedule)");
    }
    for q in &estimate.quarterly_breakdown {
        println!(
            "  {} | Sprints: {:>2} | Done: {:>7.1} | Spare: {:>7.1}",
            q.quarter, q.sprints, q.features_completed, q.remaining_capacity
        );
    }

    let outlook = &report.outlook;
    println!();
    println!("=== {} OUTLOOK ===", outlook.quarter);
    println!("  utilization:      {:.0}%", outlook.utilization_pct);
    println!("  planned:          {:.1}", outlook.planned_work);
    println!("  overflow:         {:.1}", outlook.overflow);
    if outlook.can_complete_in_quarter {
        println!("  fits in the current quarter, {:.1} spare", outlook.spare_capacity);
    } else {
        println!(
            "  needs {} more quarter(s), done in {}",
            outlook.additional_quarters_needed, outlook.completion_quarter
        );
        println!("  cut scope by:     {:.1}", outlook.overflow);
        println!("  or add:           {} man-weeks", outlook.additional_man_weeks);
    }

    if let Some(insights) = &report.insights {
        println!();
        println!("=== TEAM INSIGHTS ===");
        for m in &report.member_capacities {
            println!(
                "  {:<20} {:<26} {:.2} -> {:.2}",
                m.member_name,
                m.role.title(),
                m.base_capacity_per_sprint,
                m.effective_capacity_per_sprint
            );
        }
        for line in &insights.key_insights {
            println!("  - {line}");
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}
