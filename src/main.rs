use std::process::ExitCode;

use clap::Parser;

use sqlbind::cli::Args;
use sqlbind::db::{Database, DbError, ErrorFormatter};

fn main() -> ExitCode {
    sqlbind::logging::init();
    let args = Args::parse();
    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err((err, formatter)) => {
            // debug mode renders an HTML diagnostic, production a generic line
            eprintln!("{}", formatter.render(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<String, (DbError, ErrorFormatter)> {
    let fallback = || ErrorFormatter::new(!args.production, ErrorFormatter::DEFAULT_FALLBACK);
    let (config, options) = args.connection_settings().map_err(|e| (e, fallback()))?;
    let formatter = options.formatter();
    let mut db = Database::open(&config, options).map_err(|e| (e, formatter.clone()))?;
    let output = args
        .command
        .run(&mut db, args.format)
        .map_err(|e| (e, formatter.clone()))?;
    db.close().map_err(|e| (e, formatter))?;
    Ok(output)
}
