// src/constants.rs

/// The prefix every flag token starts with (`-v`, `--verbose`).
pub const FLAG_PREFIX: char = '-';

/// Separator between a flag and its inline value (`--name=value`).
pub const FLAG_VALUE_SEPARATOR: char = '=';

/// Pattern shared by command names and task names.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]*[A-Za-z0-9]$";

/// Pattern for a single flag alias, without its dashes.
pub const FLAG_ALIAS_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_-]*$";

// --- Built-in global flags ---

/// Enables debug level logging.
pub const FLAG_DEBUG: &str = "debug";

/// Enables info level logging.
pub const FLAG_VERBOSE: &str = "verbose";

/// Short alias of [`FLAG_VERBOSE`].
pub const FLAG_VERBOSE_SHORT: &str = "v";

/// Requests help for the resolved command.
pub const FLAG_HELP: &str = "help";

/// Short alias of [`FLAG_HELP`].
pub const FLAG_HELP_SHORT: &str = "h";

/// Hidden flag used by shell completion scripts.
pub const FLAG_BASH_COMPLETION: &str = "show-bash-completion";

// --- Messages surfaced to handlers and presenters ---

/// Failure recorded on the `do` phase when the resolved command has no `do` handler.
pub const MSG_COMMAND_NOT_PROVIDED: &str = "command not provided";

/// Name of the display configuration file inside the application config directory.
pub const DISPLAY_CONFIG_FILENAME: &str = "display.toml";
