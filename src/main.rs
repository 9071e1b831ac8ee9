use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{debug, info};

use checkontap::cli::{self, Cli};
use checkontap::config_generator::print_icinga_command_config_if_env_and_exit;
use checkontap::helper::LogConfig;
use checkontap::ontap::HttpClient;
use checkontap::{checks, install_panic_hook, Error, Runner, State};

fn main() {
    install_panic_hook();

    if let Err(err) = print_icinga_command_config_if_env_and_exit("ontap", &Cli::command()) {
        println!("{} - {}", State::Unknown, err);
        process::exit(State::Unknown.exit_code());
    }

    let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => State::Ok.exit_code(),
                _ => State::Unknown.exit_code(),
            };
            process::exit(code);
        }
    };

    let Some(command) = cli.command else {
        let mut names: Vec<_> = Cli::command()
            .get_subcommands()
            .map(|sub| sub.get_name().to_owned())
            .collect();
        names.sort();
        println!("Specify cmd, one of:\n  {}", names.join("\n  "));
        process::exit(State::Unknown.exit_code());
    };

    let connection = command.connection();
    LogConfig::from_verbosity(connection.verbose).init();
    debug!("{:?}", command);

    let timeout = cli::timeout_from_env();
    info!("connecting to {}:{}", connection.host, connection.port);

    Runner::<Error>::new()
        .with_timeout(timeout)
        .safe_run(|| {
            let api = HttpClient::new(connection.ontap_config(timeout))?;
            checks::run(&api, &command)
        })
        .print_and_exit()
}
