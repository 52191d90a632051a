// src/core/application.rs

use crate::{
    constants::{
        FLAG_BASH_COMPLETION, FLAG_DEBUG, FLAG_HELP, FLAG_HELP_SHORT, FLAG_VERBOSE,
        FLAG_VERBOSE_SHORT,
    },
    core::{
        command::Command,
        commons::dashed,
        errors::{RegistrationError, ResolveError},
        flag::Flag,
        flag_registry::{FlagRegistry, ReservedAliases},
        flag_set::{FlagSet, FlagValue},
        resolver::{self, ParsedFlags, Resolution},
        worker::Worker,
    },
    models::{AppInfo, ExitStatus},
    system::{
        display_config::DisplayConfig,
        logging,
        presenter::{ConsolePresenter, HelpView, Presenter},
    },
};
use std::{env, fmt};

/// Where an application is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Unverified,
    Verified,
    Resolved,
    Dispatched,
    Terminated,
}

/// The root of the command tree and the driver of a run.
pub struct Application {
    info: AppInfo,
    flags: FlagRegistry,
    commands: Vec<Command>,
    errors: Vec<RegistrationError>,
    state: AppState,
    display: Option<DisplayConfig>,
    presenter: Box<dyn Presenter>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("info", &self.info)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .field("errors", &self.errors)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Creates an application with the built-in global flags already registered.
    pub fn new(name: &str) -> Self {
        let mut flags = FlagRegistry::global();
        flags.add(Flag::bool(FLAG_DEBUG, "Enable debug logging"));
        flags.add(Flag::bool(FLAG_VERBOSE, "Enable verbose logging").alias(FLAG_VERBOSE_SHORT));
        flags.add(Flag::bool(FLAG_HELP, "Show help for the command").alias(FLAG_HELP_SHORT));
        flags.add(Flag::bool(FLAG_BASH_COMPLETION, "Print completion candidates").hidden());

        Self {
            info: AppInfo {
                name: name.to_string(),
                ..Default::default()
            },
            flags,
            commands: Vec::new(),
            errors: Vec::new(),
            state: AppState::Unverified,
            display: None,
            presenter: Box::new(ConsolePresenter),
        }
    }

    // --- Builder ---

    /// Sets the version shown in the header and help.
    pub fn version(mut self, version: &str) -> Self {
        self.info.version = version.to_string();
        self
    }

    /// Sets the description shown on the application help screen.
    pub fn description(mut self, description: &str) -> Self {
        self.info.description = description.to_string();
        self
    }

    /// Sets the author recorded in [`AppInfo`].
    pub fn author(mut self, author: &str) -> Self {
        self.info.author = author.to_string();
        self
    }

    /// Uses `display` instead of loading the display config file.
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = Some(display);
        self
    }

    /// Replaces the default [`ConsolePresenter`].
    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    // --- Registration ---

    /// Adds a global flag. Invalid or shadowing flags are recorded, not raised.
    pub fn add_flag(&mut self, flag: Flag) {
        self.flags.add(flag);
    }

    /// Adds a top-level command. A duplicate name is recorded, not raised.
    pub fn add_command(&mut self, command: Command) {
        if self.commands.iter().any(|c| c.name() == command.name()) {
            self.errors.push(RegistrationError::DuplicateCommand {
                name: command.name().to_string(),
                parent: self.info.name.clone(),
            });
            return;
        }
        self.commands.push(command);
    }

    /// Descriptive information about the application.
    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    /// Where the application is in its run.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// The top-level commands, in registration order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The global flag registry, built-ins included.
    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }

    /// Checks the whole declaration and returns every problem found.
    pub fn verify_config(&mut self) -> Result<(), Vec<RegistrationError>> {
        let mut errors = Vec::new();
        if self.info.name.is_empty() {
            errors.push(RegistrationError::MissingAppName);
        }
        if self.commands.is_empty() {
            errors.push(RegistrationError::NoCommands);
        }
        if self.flags.is_empty() {
            errors.push(RegistrationError::NoFlags);
        }
        errors.extend(self.errors.iter().cloned());
        errors.extend(self.flags.errors().iter().cloned());

        let mut reserved = ReservedAliases::default();
        reserved.reserve(&self.flags);
        for command in &self.commands {
            command.verify(&reserved, &mut errors);
        }

        if errors.is_empty() {
            log::debug!("configuration of {} verified", self.info.name);
            self.state = AppState::Verified;
            Ok(())
        } else {
            log::error!("{} registration error(s)", errors.len());
            Err(errors)
        }
    }

    // --- Resolution ---

    /// Resolves `args` with nothing pre-parsed. See [`Application::resolve_with`].
    pub fn resolve(&mut self, args: Vec<String>) -> Result<Resolution, ResolveError> {
        self.resolve_with(args, ParsedFlags::default())
    }

    /// Resolves `args` on top of flags that were already parsed.
    /// The configuration must have been verified first.
    pub fn resolve_with(
        &mut self,
        args: Vec<String>,
        parsed: ParsedFlags,
    ) -> Result<Resolution, ResolveError> {
        if self.state != AppState::Verified {
            return Err(ResolveError::Unverified);
        }
        let resolution = resolver::resolve(&self.flags, &self.commands, args, parsed)?;
        self.state = AppState::Resolved;
        Ok(resolution)
    }

    /// The flattened flag view of a resolution: globals, then every command on the path.
    fn flag_set(&self, resolution: &Resolution) -> FlagSet {
        let mut set = FlagSet::default();
        let chain = resolution.chain(&self.commands);
        let scopes = std::iter::once(&self.flags).chain(chain.iter().map(|c| c.flags()));
        for registry in scopes {
            for flag in registry.iter() {
                let matched = resolution.flags().get(flag.name()).cloned();
                set.push(FlagValue::new(flag.clone(), matched));
            }
        }
        set
    }

    /// Visible child commands and flags of the resolved command, as typed on a command line.
    pub fn completion_candidates(&self, resolution: &Resolution) -> Vec<String> {
        let chain = resolution.chain(&self.commands);
        let (commands, flags) = match chain.last() {
            Some(command) => (command.children(), command.flags()),
            None => (self.commands.as_slice(), &self.flags),
        };
        let mut candidates: Vec<String> = commands
            .iter()
            .filter(|c| !c.is_hidden())
            .map(|c| c.name().to_string())
            .collect();
        candidates.extend(
            flags
                .iter()
                .filter(|f| !f.is_hidden())
                .flat_map(|f| f.aliases().iter().map(|a| dashed(a))),
        );
        candidates
    }

    fn help_view<'a>(&'a self, chain: Vec<&'a Command>) -> HelpView<'a> {
        HelpView {
            info: &self.info,
            global_flags: &self.flags,
            commands: &self.commands,
            chain,
        }
    }

    // --- Dispatch ---

    /// Runs the lifecycle of the resolved command.
    pub fn dispatch(&mut self, resolution: &Resolution) -> ExitStatus {
        if self.state != AppState::Resolved {
            log::error!("dispatch requested in state {:?}", self.state);
            return ExitStatus::ConfigError;
        }
        self.state = AppState::Dispatched;

        let display = self.display.clone().unwrap_or_default();
        let flags = self.flag_set(resolution);
        let chain = resolution.chain(&self.commands);
        let Some(leaf) = chain.last() else {
            self.presenter.no_command(&self.help_view(Vec::new()));
            self.state = AppState::Terminated;
            return ExitStatus::ConfigError;
        };

        let mut worker = Worker::new(
            resolution.path().to_vec(),
            flags,
            resolution.args().to_vec(),
            display.clone(),
        );
        log::debug!("[{}] dispatching {:?}", worker.run_id(), resolution.path());

        self.presenter.header(&self.info, &display);
        let status = worker.run_lifecycle(leaf);
        self.presenter.footer(&self.info, &worker, status, &display);

        self.state = AppState::Terminated;
        status
    }

    // --- Process entry points ---

    /// Runs with the arguments of the current process.
    pub fn run_from_env(&mut self) -> ExitStatus {
        self.run(env::args().skip(1).collect())
    }

    /// The complete flow of one process run: logging flags, verification, resolution,
    /// help and completion requests, then dispatch.
    pub fn run(&mut self, mut args: Vec<String>) -> ExitStatus {
        // Logging must be configured before anything else reports, so its flags are
        // parsed ahead of resolution. Help is parsed early too so it wins over
        // resolution errors.
        let mut parsed = ParsedFlags::default();
        for name in [FLAG_DEBUG, FLAG_VERBOSE, FLAG_HELP] {
            let Some(flag) = self.flags.find(name) else {
                continue;
            };
            match flag.parse(&mut args) {
                Ok(Some(matched)) => parsed.record_preparsed(matched),
                Ok(None) => {}
                Err(e) => {
                    self.presenter.resolution_failed(&self.info, &e.into());
                    return ExitStatus::ConfigError;
                }
            }
        }
        logging::init(
            parsed.get(FLAG_DEBUG).is_some(),
            parsed.get(FLAG_VERBOSE).is_some(),
        );

        let display = match self.display.take() {
            Some(display) => display,
            None => DisplayConfig::load(&self.info.name).unwrap_or_else(|e| {
                log::warn!("{}", e);
                DisplayConfig::default()
            }),
        };
        if !display.color {
            colored::control::set_override(false);
        }
        self.display = Some(display);

        if let Err(errors) = self.verify_config() {
            self.presenter.registration_failed(&self.info, &errors);
            return ExitStatus::ConfigError;
        }

        let help_requested = parsed.get(FLAG_HELP).is_some();
        let remaining = help_requested.then(|| args.clone());
        let resolution = match self.resolve_with(args, parsed) {
            Ok(resolution) => resolution,
            Err(e) => {
                log::debug!("resolution failed: {}", e);
                if let Some(remaining) = remaining {
                    let chain = resolver::command_chain(&self.commands, &remaining);
                    self.presenter.help(&self.help_view(chain));
                    return ExitStatus::Success;
                }
                self.presenter.resolution_failed(&self.info, &e);
                return ExitStatus::ConfigError;
            }
        };

        if resolution.flags().get(FLAG_BASH_COMPLETION).is_some() {
            self.presenter
                .completion(&self.completion_candidates(&resolution));
            return ExitStatus::Success;
        }
        if resolution.flags().get(FLAG_HELP).is_some() {
            self.presenter.help(&self.help_view(resolution.chain(&self.commands)));
            return ExitStatus::Success;
        }

        self.dispatch(&resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    fn noop(_: &mut Worker) -> Result<()> {
        Ok(())
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Swallows all output so tests stay quiet.
    #[derive(Debug, Default)]
    struct SilentPresenter {
        completions: Arc<Mutex<Vec<String>>>,
        helps: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Presenter for SilentPresenter {
        fn registration_failed(&self, _: &AppInfo, _: &[RegistrationError]) {}
        fn resolution_failed(&self, _: &AppInfo, _: &ResolveError) {}
        fn no_command(&self, _: &HelpView<'_>) {}
        fn help(&self, view: &HelpView<'_>) {
            let path = view.chain.iter().map(|c| c.name().to_string()).collect();
            self.helps.lock().unwrap().push(path);
        }
        fn completion(&self, candidates: &[String]) {
            self.completions.lock().unwrap().extend(candidates.iter().cloned());
        }
        fn header(&self, _: &AppInfo, _: &DisplayConfig) {}
        fn footer(&self, _: &AppInfo, _: &Worker, _: ExitStatus, _: &DisplayConfig) {}
    }

    fn app() -> Application {
        Application::new("demo")
            .version("0.1.0")
            .with_display(DisplayConfig::default())
            .with_presenter(Box::new(SilentPresenter::default()))
    }

    #[test]
    fn test_new_registers_builtin_flags() {
        let app = app();
        for alias in ["debug", "verbose", "v", "help", "h", "show-bash-completion"] {
            assert!(app.flags().find(alias).is_some(), "missing {}", alias);
        }
        assert!(app.flags().find("show-bash-completion").unwrap().is_hidden());
    }

    #[test]
    fn test_verify_requires_commands() {
        let mut app = app();
        assert_eq!(app.verify_config(), Err(vec![RegistrationError::NoCommands]));
        assert_eq!(app.state(), AppState::Unverified);
    }

    #[test]
    fn test_verify_requires_name() {
        let mut app = Application::new("");
        app.add_command(Command::new("greet").run(noop));
        assert_eq!(app.verify_config(), Err(vec![RegistrationError::MissingAppName]));
    }

    #[test]
    fn test_registration_errors_are_aggregated() {
        let mut app = app();
        app.add_flag(Flag::bool("version", "").alias("v"));
        app.add_command(Command::new("greet").run(noop));
        app.add_command(Command::new("greet").run(noop));
        app.add_command(Command::new("status"));
        app.add_command(
            Command::new("build")
                .flag(Flag::bool("debug", ""))
                .run(noop),
        );

        let errors = app.verify_config().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, RegistrationError::DuplicateCommand { name, .. } if name == "greet")));
        assert!(errors.iter().any(|e| matches!(e, RegistrationError::MissingHandler(n) if n == "status")));
        assert!(errors.iter().any(|e| matches!(e, RegistrationError::Shadowed { alias, .. } if alias == "v")));
        assert!(errors.iter().any(|e| matches!(e, RegistrationError::Shadowed { alias, .. } if alias == "debug")));
    }

    #[test]
    fn test_shadowing_never_reaches_dispatch() {
        let mut app = app();
        app.add_command(
            Command::new("greet")
                .flag(Flag::bool("loud", "").alias("h"))
                .run(noop),
        );
        assert_eq!(app.run(args(&["greet"])), ExitStatus::ConfigError);
        assert_eq!(app.state(), AppState::Unverified);
        assert_eq!(app.resolve(args(&["greet"])), Err(ResolveError::Unverified));
    }

    #[test]
    fn test_greet_scenario() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let mut app = app();
        app.add_command(Command::new("greet").arity(1).run(move |w| {
            record.lock().unwrap().push(w.arg(0).unwrap_or_default().to_string());
            Ok(())
        }));

        assert_eq!(app.run(args(&["greet", "world"])), ExitStatus::Success);
        assert_eq!(app.state(), AppState::Terminated);
        assert_eq!(*seen.lock().unwrap(), vec!["world".to_string()]);
    }

    #[test]
    fn test_greet_too_many_arguments() {
        let mut app = app();
        app.add_command(Command::new("greet").arity(1).run(noop));
        assert_eq!(app.run(args(&["greet", "a", "b"])), ExitStatus::ConfigError);
    }

    #[test]
    fn test_no_command_is_a_config_error() {
        let mut app = app();
        app.add_command(Command::new("greet").run(noop));
        assert_eq!(app.run(Vec::new()), ExitStatus::ConfigError);
    }

    #[test]
    fn test_help_and_completion_skip_dispatch() {
        let mut app = app();
        app.add_command(Command::new("greet").run(|_| anyhow::bail!("must not run")));
        assert_eq!(app.run(args(&["greet", "--help"])), ExitStatus::Success);

        let presenter = SilentPresenter::default();
        let completions = Arc::clone(&presenter.completions);
        let mut app = Application::new("demo")
            .with_display(DisplayConfig::default())
            .with_presenter(Box::new(presenter));
        app.add_command(
            Command::new("remote")
                .subcommand(Command::new("add").flag(Flag::bool("force", "").alias("f")).run(noop))
                .subcommand(Command::new("hidden-one").hidden().run(noop)),
        );
        assert_eq!(
            app.run(args(&["remote", "--show-bash-completion"])),
            ExitStatus::Success
        );
        assert_eq!(*completions.lock().unwrap(), vec!["add".to_string()]);
    }

    #[test]
    fn test_help_wins_over_resolution_errors() {
        let presenter = SilentPresenter::default();
        let helps = Arc::clone(&presenter.helps);
        let mut app = Application::new("demo")
            .with_display(DisplayConfig::default())
            .with_presenter(Box::new(presenter));
        app.add_command(Command::new("greet").arity(1).run(|_| anyhow::bail!("must not run")));
        app.add_command(Command::new("remote").subcommand(Command::new("add").run(noop)));

        assert_eq!(app.run(args(&["greet", "a", "b", "--help"])), ExitStatus::Success);

        let mut app = Application::new("demo")
            .with_display(DisplayConfig::default())
            .with_presenter(Box::new(SilentPresenter {
                helps: Arc::clone(&helps),
                ..Default::default()
            }));
        app.add_command(Command::new("remote").subcommand(Command::new("add").run(noop)));
        assert_eq!(app.run(args(&["remote", "add", "--nope", "-h"])), ExitStatus::Success);

        assert_eq!(
            *helps.lock().unwrap(),
            vec![args(&["greet"]), args(&["remote", "add"])]
        );
    }

    #[test]
    fn test_enum_flag_without_allowed_default_is_rejected() {
        let mut app = app();
        app.add_command(
            Command::new("check")
                .flag(Flag::option("level", &["warn", "error"], "", ""))
                .run(noop),
        );
        assert_eq!(app.run(args(&["check", "--level"])), ExitStatus::ConfigError);
        assert_eq!(app.state(), AppState::Unverified);
    }

    #[test]
    fn test_group_without_selected_child_fails_at_dispatch() {
        let mut app = app();
        app.add_command(Command::new("remote").subcommand(Command::new("add").run(noop)));
        assert_eq!(app.run(args(&["remote"])), ExitStatus::Failure);
    }

    #[test]
    fn test_handlers_see_flattened_flags() {
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let mut app = app();
        app.add_command(
            Command::new("remote")
                .flag(Flag::string("remote-dir", "/tmp", ""))
                .subcommand(
                    Command::new("add")
                        .flag(Flag::numeric("depth", 1.0, ""))
                        .run(move |w| {
                            *record.lock().unwrap() = Some((
                                w.flags().value("remote-dir").to_string(),
                                w.flag("depth").and_then(|f| f.as_i64()),
                                w.flags().present("verbose"),
                                w.command_path().to_vec(),
                            ));
                            Ok(())
                        }),
                ),
        );
        assert_eq!(
            app.run(args(&["-v", "remote", "add", "--depth", "3"])),
            ExitStatus::Success
        );
        let (dir, depth, verbose, path) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(dir, "/tmp");
        assert_eq!(depth, Some(3));
        assert!(verbose);
        assert_eq!(path, args(&["remote", "add"]));
    }

    #[test]
    fn test_dispatch_requires_resolution() {
        let mut app = app();
        app.add_command(Command::new("greet").run(noop));
        assert_eq!(app.dispatch(&Resolution::default()), ExitStatus::ConfigError);
    }
}
