use {
    std::process::exit,
    tally_cli::{clap_app::get_clap_app, fees::process_command, parse_command},
};

fn main() {
    tally_logger::setup_with_default("off");

    let matches = get_clap_app(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    )
    .get_matches();

    let result = parse_command(&matches).and_then(|(config, command)| process_command(&config, &command));
    match result {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("Error: {err}");
            exit(1);
        }
    }
}
