use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("github-client")
        .about("GitHub REST client utilities")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("rate-limit").about("Fetch and print the current rate limits"))
        .subcommand(
            Command::new("parse-date")
                .about("Parse a GitHub timestamp and print it in canonical form")
                .arg(Arg::new("text").required(true).num_args(1)),
        )
        .subcommand(
            Command::new("print-date")
                .about("Print an instant (default: now) in canonical form")
                .arg(
                    Arg::new("epoch")
                        .long("epoch")
                        .num_args(1)
                        .allow_hyphen_values(true)
                        .value_parser(clap::value_parser!(i64))
                        .help("Seconds since the Unix epoch"),
                ),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
