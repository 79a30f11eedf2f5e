use carbon_cli::cli::{Cli, Command, FilterArgs, collect_overrides};
use carbon_core::aggregate::{Bucket, Summary};
use carbon_core::classify::Estimate;
use carbon_core::config::{Config, load_config_with_fallback, merge_overrides};
use carbon_core::error::AppError;
use carbon_core::model::{Task, TaskFilter};
use carbon_core::storage::JsonStore;
use carbon_core::task_api;
use clap::Parser;
use clap::error::ErrorKind;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Carbon")]
    carbon: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Suggestion")]
    suggestion: String,
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Period")]
    label: String,
    #[tabled(rename = "From")]
    start: String,
    #[tabled(rename = "To")]
    end: String,
    #[tabled(rename = "Carbon")]
    carbon: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Carbon")]
    carbon: String,
}

struct Context {
    config: Config,
    offset: UtcOffset,
    store: JsonStore,
    json: bool,
}

fn status_label(task: &Task) -> &'static str {
    if task.completed { "done" } else { "pending" }
}

fn format_carbon(value: f64) -> String {
    format!("{value:.2}")
}

fn format_local(value: OffsetDateTime, offset: UtcOffset) -> Result<String, AppError> {
    value
        .checked_to_offset(offset)
        .ok_or_else(|| {
            AppError::invalid_data("timestamp is out of range for the configured offset")
        })?
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

fn print_tasks_plain(tasks: &[Task], offset: UtcOffset) -> Result<(), AppError> {
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        rows.push(TaskRow {
            id: task.id,
            name: task.name.clone(),
            category: task.category.to_string(),
            carbon: format_carbon(task.carbon),
            status: status_label(task),
            created_at: format_local(task.created_at, offset)?,
            suggestion: task.suggestion.clone(),
        });
    }
    print_table(rows);
    Ok(())
}

fn print_task_plain(verb: &str, task: &Task, ctx: &Context) {
    println!(
        "{} task: {} ({}) | {} | {} | {}",
        verb,
        task.name,
        task.id,
        task.category,
        format_carbon(task.carbon),
        status_label(task)
    );
    if !task.suggestion.is_empty() {
        println!("{}", ctx.config.palette().mutedize(&task.suggestion));
    }
}

fn print_estimate_plain(name: &str, estimate: &Estimate, ctx: &Context) {
    println!(
        "Estimate for {}: {} | {}",
        name.trim(),
        estimate.category,
        format_carbon(estimate.carbon)
    );
    println!("{}", ctx.config.palette().mutedize(&estimate.suggestion));
}

fn bucket_rows(buckets: &[Bucket]) -> Vec<BucketRow> {
    buckets
        .iter()
        .map(|bucket| BucketRow {
            label: bucket.label.clone(),
            start: bucket.start.to_string(),
            end: bucket.end.to_string(),
            carbon: format_carbon(bucket.carbon),
        })
        .collect()
}

fn print_summary_plain(summary: &Summary, ctx: &Context) {
    let palette = ctx.config.palette();
    println!("Total: {}", format_carbon(summary.total));
    if let (Some(budget), Some(remaining)) = (summary.budget, summary.budget_remaining) {
        println!("Budget: {}", format_carbon(budget));
        if summary.is_over_budget() {
            println!(
                "{}",
                palette.alertize(&format!("Over budget by {}", format_carbon(-remaining)))
            );
        } else {
            println!("Remaining: {}", format_carbon(remaining));
        }
    }

    println!("\nLast 7 days");
    print_table(bucket_rows(&summary.daily));
    println!("\nLast 4 weeks");
    print_table(bucket_rows(&summary.weekly));
    println!("\nBy category");
    print_table(
        summary
            .categories
            .iter()
            .map(|entry| CategoryRow {
                category: entry.category.to_string(),
                carbon: format_carbon(entry.carbon),
            })
            .collect(),
    );
}

fn task_filter(args: FilterArgs) -> TaskFilter {
    TaskFilter {
        category: args.category,
        search: args.search,
    }
}

fn reference_now(at: Option<&str>, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let now = match at {
        Some(raw) => OffsetDateTime::parse(raw.trim(), &Rfc3339)
            .map_err(|_| AppError::invalid_input("--at must be an RFC 3339 datetime"))?,
        None => OffsetDateTime::now_utc(),
    };
    now.checked_to_offset(offset)
        .ok_or_else(|| AppError::invalid_input("--at is out of range for the configured offset"))
}

fn run_command(command: Command, ctx: &Context) -> Result<(), AppError> {
    let store = &ctx.store;
    match command {
        Command::Add { name, carbon } => {
            let task = task_api::add_task(store, name.as_deref().unwrap_or(""), carbon.as_deref())?;
            if ctx.json {
                print_json(&task)?;
            } else {
                print_task_plain("Added", &task, ctx);
            }
        }
        Command::Estimate { name, carbon } => {
            let name = name.unwrap_or_default();
            let estimate = task_api::estimate_task(&name, carbon.as_deref())?;
            if ctx.json {
                print_json(&estimate)?;
            } else {
                print_estimate_plain(&name, &estimate, ctx);
            }
        }
        Command::List { filter } => {
            let tasks = task_api::list_tasks(store, &task_filter(filter))?;
            if ctx.json {
                print_json(&tasks)?;
            } else {
                print_tasks_plain(&tasks, ctx.offset)?;
            }
        }
        Command::Show { id } => {
            let task = task_api::get_task(store, task_api::parse_task_id(&id)?)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                print_tasks_plain(std::slice::from_ref(&task), ctx.offset)?;
            }
        }
        Command::Done { id } => {
            let task = task_api::complete_task(store, task_api::parse_task_id(&id)?)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                print_task_plain("Completed", &task, ctx);
            }
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(store, task_api::parse_task_id(&id)?)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                print_task_plain("Deleted", &task, ctx);
            }
        }
        Command::Clear => {
            let removed = task_api::clear_tasks(store)?;
            if ctx.json {
                print_json(&serde_json::json!({ "removed": removed }))?;
            } else {
                println!("Cleared {removed} task(s)");
            }
        }
        Command::Summary { filter, at } => {
            let now = reference_now(at.as_deref(), ctx.offset)?;
            let view = task_api::dashboard(
                store,
                &task_filter(filter),
                now,
                Some(ctx.config.budget()),
            )?;
            if ctx.json {
                print_json(&view)?;
            } else {
                print_summary_plain(&view.summary, ctx);
            }
        }
        Command::Seed => {
            let seeded = task_api::seed_sample_tasks(store, OffsetDateTime::now_utc())?;
            if ctx.json {
                print_json(&seeded)?;
            } else {
                println!("Added {} sample task(s)", seeded.len());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("CARBONTRACK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A subscriber may already be set when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn build_context(cli: &Cli) -> Result<Context, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        tracing::warn!(%err, "failed to load config; using defaults");
    }

    let overrides = collect_overrides(&cli.config_override)?;
    let config = merge_overrides(&loaded.config, &overrides);
    let offset = config.reference_offset()?;
    let store = JsonStore::from_env()?;
    tracing::debug!(path = %store.path().display(), %offset, "resolved store");

    Ok(Context {
        config,
        offset,
        store,
        json: cli.json,
    })
}

fn run(cli: Cli) -> Result<(), AppError> {
    let ctx = build_context(&cli)?;
    run_command(cli.command, &ctx)
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
