use mesongo::commands;
use mesongo::utils::log::{log, LogLevel};
use std::env;
use std::process;

fn main() {
    if let Err(why) = ctrlc::set_handler(|| process::exit(0)) {
        log(LogLevel::Warn, &format!("Could not install interrupt handler: {}", why));
    }
    let argv: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    process::exit(commands::run_cli(argv));
}
