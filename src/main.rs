use osh::config::ShellConfig;
use osh::flags::Flags;
use osh::process::signal;
use osh::shell::Shell;
use std::env;

fn main() -> Result<(), osh::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("osh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ShellConfig::from_flags(&flags)?;
    osh::logging::init(config.debug);
    signal::setup_signal_handlers(config.quiet)?;

    let mut shell = Shell::new(config);
    if shell.run().is_err() {
        // Already reported by the loop.
        std::process::exit(1);
    }
    Ok(())
}
