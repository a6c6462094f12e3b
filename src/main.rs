pub mod cli;
pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod display;
pub mod error;
pub mod logging;
pub mod settings;
pub mod util;

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::{
    cli::{Args, Command},
    crawler::{nse, QuoteSource},
    declare::DisplaySetting,
    logging::Logger,
    settings::Settings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse_env();

    let app = match config::App::load(args.debug) {
        Ok(app) => app,
        Err(why) => {
            logging::error_console(format!("{:#}", why));
            return ExitCode::FAILURE;
        }
    };

    let (logger, _guard) = Logger::new(&app);
    logger.debug(format!("arguments: {:?}", args));

    match run(&app, args.mode(), &logger).await {
        Ok(code) => code,
        Err(why) => {
            logger.error(format!("{:#}", why));
            ExitCode::FAILURE
        }
    }
}

async fn run(app: &config::App, mode: Command, logger: &Logger) -> Result<ExitCode> {
    if mode == Command::Help {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    let nse = nse::Nse::new(&app.nse, logger)?;
    let db_path = app.database_path()?;
    let settings = Settings::open_or_bootstrap(&db_path, &nse, logger)
        .await
        .with_context(|| format!("Failed to open the settings store {}", db_path.display()))?;

    let result = dispatch(&settings, &nse, mode, logger).await;
    settings.close().await;
    result
}

async fn dispatch(
    settings: &Settings,
    nse: &nse::Nse,
    mode: Command,
    logger: &Logger,
) -> Result<ExitCode> {
    match mode {
        Command::Quote(code) => {
            if show_quote(settings, nse, &code, logger, &mut io::stdout()).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::CurrentFields => {
            let fields = settings.get(DisplaySetting::CurrentFields).await?;
            print!("{}", display::field_list("Current Display Fields", &fields));
            Ok(ExitCode::SUCCESS)
        }
        Command::AllFields => {
            let fields = settings.get(DisplaySetting::AllFields).await?;
            print!("{}", display::field_list("ALL DISPLAY FIELDS", &fields));
            Ok(ExitCode::SUCCESS)
        }
        Command::AddFields(fields) => {
            settings.add_fields(&fields).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset => {
            settings.reset_fields().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::RemoveFields(fields) => {
            settings.remove_fields(&fields).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Help => Ok(ExitCode::SUCCESS),
    }
}

/// Writes the quote, or the probable matches when the exchange does not know `code`.
///
/// Returns `false` when `code` turned out to be invalid.
async fn show_quote(
    settings: &Settings,
    source: &(impl QuoteSource + Sync),
    code: &str,
    logger: &Logger,
    out: &mut impl Write,
) -> Result<bool> {
    let quote = match source.fetch_quote(code).await {
        Ok(quote) => quote,
        Err(error::Error::InvalidCode(code)) => {
            let catalog = settings.catalog().await?;
            let matches = nse::find_probable_matches(&code, &catalog);
            write!(out, "{}", display::probable_matches(&code, &matches))?;
            return Ok(false);
        }
        Err(why) => return Err(why.into()),
    };

    let fields = settings.get(DisplaySetting::CurrentFields).await?;
    let name = match settings.lookup_name(code).await {
        Ok(name) => Some(name),
        Err(why) => {
            logger.warn(format!("no company name for {}: {}", code, why));
            None
        }
    };

    write!(out, "{}", display::quote(&quote, &fields, name.as_deref()))?;
    Ok(true)
}
