mod app;
mod logic;
mod models;
mod opt;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use crate::opt::Opt;
use crate::utils::logging;

fn main() -> ExitCode {
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(err) => return crate::opt::exit_for_parse_error(err),
    };

    if let Err(err) = logging::init(&opt.audit_log) {
        eprintln!("{:#}", err);
    }

    match app::run(&opt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logging::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
