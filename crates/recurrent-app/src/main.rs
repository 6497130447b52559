use anyhow::Result;
use clap::{Parser, Subcommand};
use recurrent_app::args;
use recurrent_app::commands::{self, delete, expand, revise};
use recurrent_core::config::load_config;
use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::expand::ExpansionLimits;
use recurrent_service::series::EditScope;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recurrent")]
#[command(about = "Expand RFC 5545 recurrence rules and revise recurring components")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the occurrences of a rule
    Expand {
        /// First occurrence, e.g. 20240108T093000Z or TZID=Europe/Berlin:20240108T093000
        #[arg(long, value_parser = args::temporal)]
        start: Temporal,

        /// Recurrence rule, e.g. FREQ=WEEKLY;BYDAY=MO,WE
        #[arg(long, value_parser = args::rule)]
        rule: Option<RRule>,

        /// Only list occurrences at or after this value
        #[arg(long, value_parser = args::temporal)]
        from: Option<Temporal>,

        /// Only list occurrences before this value (needs --from)
        #[arg(long, value_parser = args::temporal, requires = "from")]
        to: Option<Temporal>,

        /// Maximum number of occurrences to list
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long = "exdate", value_parser = args::temporal)]
        exdates: Vec<Temporal>,

        #[arg(long = "rdate", value_parser = args::temporal)]
        rdates: Vec<Temporal>,

        #[arg(long)]
        json: bool,
    },
    /// Revise one occurrence of a component stored in an .ics file
    Revise {
        #[arg(short, long)]
        file: String,

        /// UID of the component (defaults to the first recurring one)
        #[arg(long)]
        uid: Option<String>,

        /// Original start of the occurrence to change
        #[arg(long, value_parser = args::temporal)]
        occurrence: Temporal,

        /// New start of the occurrence
        #[arg(long, value_parser = args::temporal)]
        start: Temporal,

        /// New end of the occurrence
        #[arg(long, value_parser = args::temporal)]
        end: Option<Temporal>,

        /// New summary
        #[arg(long)]
        summary: Option<String>,

        /// ONE, ALL, ALL_IGNORE_RECURRENCES, THIS_AND_FUTURE, THIS_AND_FUTURE_IGNORE_RECURRENCES or CANCEL
        #[arg(long, value_parser = args::scope)]
        scope: EditScope,

        #[arg(long)]
        json: bool,
    },
    /// Delete occurrences of a component stored in an .ics file
    Delete {
        #[arg(short, long)]
        file: String,

        #[arg(long)]
        uid: Option<String>,

        /// Original start of the occurrence to delete (not needed for ALL)
        #[arg(long, value_parser = args::temporal)]
        occurrence: Option<Temporal>,

        #[arg(long, value_parser = args::scope)]
        scope: EditScope,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let limits = ExpansionLimits::from(config.expansion);
    let prodid = config.calendar.prodid.as_str();

    let output = match Cli::parse().command {
        Commands::Expand {
            start,
            rule,
            from,
            to,
            limit,
            exdates,
            rdates,
            json,
        } => {
            let request = expand::ExpandArgs {
                start,
                rule,
                from,
                to,
                limit,
                exdates,
                rdates,
            };
            let occurrences = expand::run(&request, limits)?;
            expand::render(&occurrences, json)?
        }
        Commands::Revise {
            file,
            uid,
            occurrence,
            start,
            end,
            summary,
            scope,
            json,
        } => {
            let original = commands::load_component(&file, uid.as_deref())?;
            let request = revise::ReviseArgs {
                occurrence,
                start,
                end,
                summary,
                scope,
            };
            let revision = revise::run(&original, &request)?;
            commands::render_revision(&revision, prodid, json)?
        }
        Commands::Delete {
            file,
            uid,
            occurrence,
            scope,
            json,
        } => {
            let original = commands::load_component(&file, uid.as_deref())?;
            let revision = delete::run(&original, occurrence, scope)?;
            commands::render_revision(&revision, prodid, json)?
        }
    };

    print!("{output}");
    Ok(())
}
