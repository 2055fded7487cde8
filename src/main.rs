//! # Gift Survey CLI (`gifts`)
//!
//! Records questionnaire answers, shows saved progress, prints reports and
//! maintains the participant store.
//!
//! ## Usage
//!
//! ```bash
//! gifts --config ./config/gifts.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gifts init` | Write a starter config and an empty store |
//! | `gifts questions` | Print the 45 statements |
//! | `gifts check-config` | Validate the gift partition |
//! | `gifts sources` | Show backend status and record counts |
//! | `gifts answer <name> Q=V...` | Record answers for a participant |
//! | `gifts show <name>` | Show saved progress and scores |
//! | `gifts reset <name>` | Clear a participant's answers |
//! | `gifts report` | Rank participants per gift |
//! | `gifts top -n 3` | Top participants per gift |
//! | `gifts summary` | Each participant's top gift |
//! | `gifts migrate --execute` | Move legacy keys to normalized keys |
//! | `gifts resolve <name> --keep legacy` | Settle a legacy/canonical conflict |
//!
//! ## Examples
//!
//! ```bash
//! gifts answer "Maíra Souza" 1=3 10=2 19=3 --church "Igreja Central"
//! gifts show "Maíra Souza"
//! gifts report --all
//! gifts migrate            # dry run
//! gifts migrate --execute
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gift_survey::{
    answer, backend, config, init, logging, migrate, questions, report, show, sources,
};
use gift_survey_core::migration::ConflictChoice;

/// Gift Survey: a spiritual gifts self-assessment with per-gift reports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. `gifts init` writes a starter one.
#[derive(Parser)]
#[command(
    name = "gifts",
    about = "Gift Survey: spiritual gifts self-assessment with remote and local storage",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gifts.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config (if missing) and create an empty store file.
    Init,

    /// Print every question with its number.
    Questions,

    /// Validate that the gift partition covers each question exactly once.
    CheckConfig,

    /// Show each backend's status and record count.
    Sources,

    /// Record answers for a participant.
    ///
    /// Existing progress is loaded first, so answers can be given across
    /// several runs. Answering a question again replaces the old value.
    Answer {
        /// Participant name as typed; the storage key is derived from it.
        name: String,

        /// Answers as `QUESTION=VALUE` pairs, e.g. `12=3`.
        #[arg(value_parser = answer::parse_answer, required = true)]
        answers: Vec<(u32, u8)>,

        /// Church name stored with the record.
        #[arg(long)]
        church: Option<String>,
    },

    /// Show a participant's saved progress and ranked scores.
    Show {
        name: String,
    },

    /// Clear a participant's answers.
    Reset {
        name: String,
    },

    /// Rank participants by score for every gift.
    Report {
        /// Include participants who have not finished.
        #[arg(long)]
        all: bool,
    },

    /// The highest-scoring participants for every gift.
    Top {
        #[arg(short = 'n', long, default_value_t = 3)]
        n: usize,

        /// Include participants who have not finished.
        #[arg(long)]
        all: bool,
    },

    /// One line per participant with their top gift.
    Summary,

    /// Move records stored under raw names to normalized keys.
    ///
    /// Runs as a dry run unless `--execute` is given.
    Migrate {
        #[arg(long)]
        execute: bool,
    },

    /// Settle a conflict between a legacy record and its normalized key.
    Resolve {
        /// The legacy key (the participant name as originally typed).
        name: String,

        /// Which record survives: `canonical` or `legacy`.
        #[arg(long, value_parser = migrate::parse_choice)]
        keep: ConflictChoice,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Init => {
            logging::init("warn");
            return init::run_init(&cli.config);
        }
        Commands::Questions => {
            logging::init("warn");
            return questions::run_questions();
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging.level);
    backend::check_catalog(&cfg);

    match cli.command {
        Commands::Init | Commands::Questions => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::CheckConfig => questions::run_check_config(&cfg)?,
        Commands::Sources => sources::list_sources(&cfg)?,
        Commands::Answer {
            name,
            answers,
            church,
        } => answer::run_answer(&cfg, &name, &answers, church.as_deref())?,
        Commands::Show { name } => show::run_show(&cfg, &name)?,
        Commands::Reset { name } => answer::run_reset(&cfg, &name)?,
        Commands::Report { all } => report::run_report(&cfg, all)?,
        Commands::Top { n, all } => report::run_top(&cfg, n, all)?,
        Commands::Summary => report::run_summary(&cfg)?,
        Commands::Migrate { execute } => migrate::run_migrate(&cfg, execute)?,
        Commands::Resolve { name, keep } => migrate::run_resolve(&cfg, &name, keep)?,
    }

    Ok(())
}
