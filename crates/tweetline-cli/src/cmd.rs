//! Subcommand execution: authenticate once, run the orchestration,
//! persist the result table

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use tweetline_core::ProgressContext;
use tweetline_twitter::{
    Extraction, FetchParams, Orchestration, ResultType, authenticate, run_hashtags, run_replies,
    run_search_queries, run_search_users, run_timelines,
};

use crate::config::Config;
use crate::input;

#[derive(Args, Debug)]
pub struct ModeArgs {
    /// Input list, one row per line (`username[,type]` for user modes)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Total items to collect per extraction
    #[arg(short = 'n', long)]
    pub extraction_size: Option<usize>,

    /// Items per page request (remote maximum 200)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Languages for the search-based modes (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Result ordering preference
    #[arg(long, value_enum)]
    pub result_type: Option<ResultTypeArg>,

    /// Upper date bound (YYYY-MM-DD) for search-based modes
    #[arg(long, value_parser = parse_date)]
    pub until: Option<NaiveDate>,

    /// Zstd compression level (1-22)
    #[arg(short, long)]
    pub zstd_level: Option<i32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResultTypeArg {
    Mixed,
    Recent,
    Popular,
}

impl From<ResultTypeArg> for ResultType {
    fn from(arg: ResultTypeArg) -> Self {
        match arg {
            ResultTypeArg::Mixed => ResultType::Mixed,
            ResultTypeArg::Recent => ResultType::Recent,
            ResultTypeArg::Popular => ResultType::Popular,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date format: {e}"))
}

fn parse_result_type(s: &str) -> Result<ResultType> {
    match s {
        "mixed" => Ok(ResultType::Mixed),
        "recent" => Ok(ResultType::Recent),
        "popular" => Ok(ResultType::Popular),
        other => anyhow::bail!("Unknown result_type: {other} (expected mixed, recent or popular)"),
    }
}

fn build_params(args: &ModeArgs, config: &Config) -> Result<FetchParams> {
    let result_type = match args.result_type {
        Some(arg) => arg.into(),
        None => parse_result_type(&config.extract.result_type)?,
    };
    Ok(FetchParams {
        page_size: args.page_size.unwrap_or(config.extract.page_size),
        extraction_size: args.extraction_size.unwrap_or(config.extract.extraction_size),
        result_type,
        until: args.until,
        exclude_replies: config.extract.exclude_replies,
        include_rts: config.extract.include_rts,
    })
}

pub fn run(
    orchestration: Orchestration,
    args: ModeArgs,
    config: &Config,
    progress: &ProgressContext,
) -> Result<()> {
    let params = build_params(&args, config)?;
    let languages = args
        .languages
        .clone()
        .unwrap_or_else(|| config.extract.languages.clone());
    let out_dir = args.out.clone().unwrap_or_else(|| config.output.dir.clone());
    let zstd_level = args.zstd_level.unwrap_or(config.output.compression_level);

    log::info!("Running {orchestration} extraction");
    log::info!("  Input: {}", args.input.display());
    log::info!("  Output: {}", out_dir.display());

    // One authenticated handle per invocation; every orchestration shares
    // its rate-limit counters
    let credentials = config.credentials.resolve()?;
    let client = authenticate(credentials, &config.api.base_url)?;

    let extraction: Extraction = match orchestration {
        Orchestration::Timelines => {
            let rows = input::load_user_rows(&args.input)?;
            let pb = progress.row_bar(orchestration.table_name(), rows.len() as u64);
            run_timelines(&client, &rows, &params, &pb)
        }
        Orchestration::Replies => {
            let rows = input::load_user_rows(&args.input)?;
            let pb = progress.row_bar(orchestration.table_name(), rows.len() as u64);
            run_replies(&client, &rows, &params, &languages, &pb)
        }
        Orchestration::SearchUsers => {
            let rows = input::load_user_rows(&args.input)?;
            let pb = progress.row_bar(orchestration.table_name(), rows.len() as u64);
            run_search_users(&client, &rows, &params, &languages, &pb)
        }
        Orchestration::SearchQueries => {
            let rows = input::load_query_rows(&args.input)?;
            let pb = progress.row_bar(orchestration.table_name(), rows.len() as u64);
            run_search_queries(&client, &rows, &params, &languages, &pb)
        }
        Orchestration::Hashtags => {
            let rows = input::load_hashtag_rows(&args.input)?;
            let pb = progress.row_bar(orchestration.table_name(), rows.len() as u64);
            run_hashtags(&client, &rows, &params, &languages, &pb)
        }
    };

    let path = tweetline_core::write_table(
        &out_dir,
        orchestration.table_name(),
        &extraction.table,
        zstd_level,
    )?;

    let summary = &extraction.summary;
    print_summary(
        orchestration.table_name(),
        &[
            (
                "Rows",
                format!("{} in, {} skipped", summary.rows_in, summary.rows_skipped),
            ),
            (
                "Extractions",
                format!(
                    "{} issued, {} returned nothing",
                    summary.extractions, summary.empty_extractions
                ),
            ),
            ("Records", summary.records.to_string()),
            ("Output", path.display().to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    Ok(())
}

/// Print a key-value summary table on stderr
fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

pub fn show_config(config: &Config) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["API base URL", &config.api.base_url]);
    table.add_row(vec![
        "Credentials",
        if config.credentials.configured() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec![
        "Output directory",
        &config.output.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Compression level",
        &config.output.compression_level.to_string(),
    ]);
    table.add_row(vec!["Page size", &config.extract.page_size.to_string()]);
    table.add_row(vec![
        "Extraction size",
        &config.extract.extraction_size.to_string(),
    ]);
    table.add_row(vec!["Languages", &config.extract.languages.join(", ")]);
    table.add_row(vec!["Result type", &config.extract.result_type]);

    eprintln!("\n{table}");
}
