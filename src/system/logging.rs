// src/system/logging.rs

use log::LevelFilter;

/// Level selected by the built-in logging flags. `--debug` beats `--verbose`.
pub fn level_for(debug: bool, verbose: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Installs the `env_logger` backend. `RUST_LOG` still refines the level chosen by the flags.
///
/// Returns `false` when a logger was already installed (e.g. by an earlier run in the same process).
pub fn init(debug: bool, verbose: bool) -> bool {
    let installed = env_logger::Builder::new()
        .filter_level(level_for(debug, verbose))
        .parse_default_env()
        .format_timestamp(None)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("logging initialised (debug: {}, verbose: {})", debug, verbose);
    }
    installed
}
