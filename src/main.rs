#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # rollcall
//! ## Introduction
//!
//! Forms random student groups and posts assessment grades to Asana.
//!
//! ## Configuration
//!
//! Set `ASANA_TOKEN` and `ASANA_PROJECT_ID` in the environment or in a `.env`
//! file. `download-students` caches the roster to `data/students.json`;
//! `post-grades` reads the grade export from `data/grades.csv` unless
//! `ROLLCALL_GRADES_PATH` says otherwise.

use std::process::ExitCode;

use anyhow::Result;
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use rollcall::{
    Config, InternalError,
    commands::{self, PostGradesOutcome, render_dry_run, render_report},
    constants::DEFAULT_GROUP_SIZE,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Cache the roster from Asana
    DownloadStudents,
    /// Print random groups
    MakeGroups {
        /// Names to leave out
        exclude: Vec<String>,
        /// People per group
        size:    String,
    },
    /// Post grades for an assessment
    PostGrades {
        /// Only print what would be posted
        dry_run:    bool,
        /// Assessment name as it appears in the export
        assessment: String,
    },
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    let download_students = pure(Cmd::DownloadStudents)
        .to_options()
        .command("download-students")
        .help("Download the student roster from Asana");

    let exclude = long("exclude")
        .help("Comma separated names to leave out")
        .argument::<String>("NAMES")
        .many();
    let size = positional::<String>("SIZE")
        .help("Number of students per group")
        .fallback(DEFAULT_GROUP_SIZE.to_string());
    let make_groups = construct!(Cmd::MakeGroups { exclude, size })
        .to_options()
        .command("make-groups")
        .help("Split the cached roster into random groups");

    let dry_run = long("dry-run")
        .help("Print the grades that would be posted without posting them")
        .switch();
    let assessment = positional::<String>("ASSESSMENT").help("Name of the assessment to post");
    let post_grades = construct!(Cmd::PostGrades {
        dry_run,
        assessment
    })
    .to_options()
    .command("post-grades")
    .help("Post assessment grades to each student's Asana task");

    let cmd = construct!([download_students, make_groups, post_grades]);

    cmd.to_options()
        .descr("Student groups and grade posting for Asana-tracked classes")
        .run()
}

/// Runs a parsed command against `config`.
async fn run(cmd: Cmd, config: &Config) -> Result<()> {
    match cmd {
        Cmd::DownloadStudents => {
            let students = commands::download_students(config).await?;
            println!("Downloaded {} students.", students.len());
        }
        Cmd::MakeGroups { exclude, size } => {
            let groups =
                commands::make_groups(config, &size, &exclude, &mut rand::thread_rng()).await?;
            println!("{groups}");
        }
        Cmd::PostGrades {
            dry_run,
            assessment,
        } => match commands::post_grades(config, &assessment, dry_run).await? {
            PostGradesOutcome::DryRun(grades) => {
                print!("{}", render_dry_run(&grades).as_str().green())
            }
            PostGradesOutcome::Published(report) => print!("{}", render_report(&report)),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    let config = Config::from_env();

    match run(cmd, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match e.downcast_ref::<InternalError>() {
            Some(internal) => {
                eprintln!("{}", format!("Error: {internal}").red());
                Ok(ExitCode::FAILURE)
            }
            None => Err(e),
        },
    }
}
