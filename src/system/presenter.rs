// src/system/presenter.rs

//! Presentation boundary.
//!
//! The application calls a [`Presenter`] at fixed points of a run and never looks at
//! what it prints. [`ConsolePresenter`] is the default, writing to the terminal.

use crate::{
    core::{
        command::Command,
        commons::dashed,
        errors::{RegistrationError, ResolveError},
        flag::Flag,
        flag_registry::FlagRegistry,
        worker::Worker,
    },
    models::{AppInfo, ExitStatus, PhaseName, PhaseStatus},
    system::display_config::DisplayConfig,
};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Everything the help screen of one command (or of the application) needs.
#[derive(Debug)]
pub struct HelpView<'a> {
    pub info: &'a AppInfo,
    pub global_flags: &'a FlagRegistry,
    pub commands: &'a [Command],
    /// The resolved commands, root first. Empty for application help.
    pub chain: Vec<&'a Command>,
}

/// Output sink for everything a run shows the user.
pub trait Presenter: Send + Sync {
    fn registration_failed(&self, info: &AppInfo, errors: &[RegistrationError]);
    fn resolution_failed(&self, info: &AppInfo, error: &ResolveError);
    /// Argv named no command and no help was asked for.
    fn no_command(&self, view: &HelpView<'_>);
    fn help(&self, view: &HelpView<'_>);
    fn completion(&self, candidates: &[String]);
    fn header(&self, info: &AppInfo, display: &DisplayConfig);
    fn footer(&self, info: &AppInfo, worker: &Worker, status: ExitStatus, display: &DisplayConfig);
}

/// The default terminal presenter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn registration_failed(&self, info: &AppInfo, errors: &[RegistrationError]) {
        eprintln!(
            "\n{}: {} has {} configuration error(s):",
            "Error".red().bold(),
            info.name.yellow(),
            errors.len()
        );
        for error in errors {
            eprintln!("  {} {}", "-".dimmed(), error);
        }
    }

    fn resolution_failed(&self, info: &AppInfo, error: &ResolveError) {
        eprintln!("\n{}: {}", "Error".red().bold(), error);
        eprintln!(
            "{}",
            format!("Run '{} --help' for usage.", info.name).dimmed()
        );
    }

    fn no_command(&self, view: &HelpView<'_>) {
        print!("{}", render_help(view));
        eprintln!("\n{}: no command given", "Error".red().bold());
    }

    fn help(&self, view: &HelpView<'_>) {
        print!("{}", render_help(view));
    }

    fn completion(&self, candidates: &[String]) {
        for candidate in candidates {
            println!("{}", candidate);
        }
    }

    fn header(&self, info: &AppInfo, display: &DisplayConfig) {
        if display.show_header {
            let title = format!("{} {}", info.name, info.version);
            println!("{}", title.trim_end().bold());
        }
    }

    fn footer(&self, info: &AppInfo, worker: &Worker, status: ExitStatus, display: &DisplayConfig) {
        if !display.show_footer {
            return;
        }
        let command = worker.command_path().join(" ");
        let elapsed = format_duration(worker.elapsed());
        match (status, worker.first_failure()) {
            (ExitStatus::Success, _) => println!(
                "{} {} {} in {}",
                "✔".green(),
                info.name,
                command.cyan(),
                elapsed.dimmed()
            ),
            (_, Some((phase, message))) => eprintln!(
                "{} {} {} failed in {} phase after {}: {}",
                "✘".red(),
                info.name,
                command.cyan(),
                phase.to_string().yellow(),
                elapsed.dimmed(),
                message
            ),
            (_, None) => eprintln!("{} {} {} failed", "✘".red(), info.name, command.cyan()),
        }
        if log::log_enabled!(log::Level::Debug) {
            match phase_summary(worker) {
                Ok(summary) => log::debug!("phases: {}", summary),
                Err(e) => log::debug!("could not summarise phases: {}", e),
            }
        }
    }
}

#[derive(Serialize)]
struct PhaseSummary<'a> {
    phase: PhaseName,
    status: PhaseStatus,
    elapsed_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a str>,
}

/// The phases that left `pending`, as a JSON array.
fn phase_summary(worker: &Worker) -> serde_json::Result<String> {
    let phases: Vec<PhaseSummary<'_>> = worker
        .phases()
        .filter(|p| p.status() != PhaseStatus::Pending)
        .map(|p| PhaseSummary {
            phase: p.name(),
            status: p.status(),
            elapsed_ms: p.elapsed().map(|d| d.as_millis()),
            failure: p.failure(),
        })
        .collect();
    serde_json::to_string(&phases)
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() > 0 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}

fn flag_line(flag: &Flag) -> (String, String) {
    let aliases: Vec<String> = flag.aliases().iter().map(|a| dashed(a)).collect();
    let mut usage = flag.usage().to_string();
    let default = flag.default_value();
    if !default.is_empty() && default != "false" {
        if !usage.is_empty() {
            usage.push(' ');
        }
        usage.push_str(&format!("(default: {})", default));
    }
    (aliases.join(", "), usage)
}

fn write_flags<'a>(out: &mut String, title: &str, flags: impl Iterator<Item = &'a Flag>) {
    let lines: Vec<_> = flags.filter(|f| !f.is_hidden()).map(flag_line).collect();
    if lines.is_empty() {
        return;
    }
    let width = lines.iter().map(|(a, _)| a.len()).max().unwrap_or(0);
    let _ = writeln!(out, "\n{}", title.bold());
    for (aliases, usage) in lines {
        let _ = writeln!(out, "  {:<width$}  {}", aliases.cyan(), usage, width = width);
    }
}

fn write_commands(out: &mut String, title: &str, commands: &[Command]) {
    let mut groups: BTreeMap<&str, Vec<&Command>> = BTreeMap::new();
    for command in commands.iter().filter(|c| !c.is_hidden()) {
        groups.entry(command.category_name()).or_default().push(command);
    }
    if groups.is_empty() {
        return;
    }
    let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
    for (category, list) in groups {
        let heading = if category.is_empty() { title } else { category };
        let _ = writeln!(out, "\n{}", heading.bold());
        for command in list {
            let _ = writeln!(
                out,
                "  {:<width$}  {}",
                command.name().cyan(),
                command.short_text(),
                width = width
            );
        }
    }
}

/// Renders the help screen for the resolved command, or for the application when the
/// chain is empty.
pub fn render_help(view: &HelpView<'_>) -> String {
    let mut out = String::new();
    let info = view.info;
    let _ = writeln!(out, "{} {}", info.name.bold(), info.version);

    match view.chain.last() {
        None => {
            if !info.description.is_empty() {
                let _ = writeln!(out, "{}", info.description);
            }
            let _ = writeln!(
                out,
                "\n{} {} [flags] <command> [subcommand...] [args...]",
                "Usage:".bold(),
                info.name
            );
            write_commands(&mut out, "Commands", view.commands);
        }
        Some(command) => {
            let path: Vec<&str> = view.chain.iter().map(|c| c.name()).collect();
            let description = if command.long_text().is_empty() {
                command.short_text()
            } else {
                command.long_text()
            };
            if !description.is_empty() {
                let _ = writeln!(out, "{}", description);
            }
            let mut usage = format!("{} {}", info.name, path.join(" "));
            if command.has_children() {
                usage.push_str(" <subcommand>");
            }
            if !command.flags().is_empty() {
                usage.push_str(" [flags]");
            }
            if !command.usage_text().is_empty() {
                usage.push(' ');
                usage.push_str(command.usage_text());
            }
            let _ = writeln!(out, "\n{} {}", "Usage:".bold(), usage);
            write_commands(&mut out, "Subcommands", command.children());
            write_flags(&mut out, "Flags", command.flags().iter());
            for ancestor in view.chain.iter().rev().skip(1) {
                write_flags(
                    &mut out,
                    &format!("Flags of {}", ancestor.name()),
                    ancestor.flags().iter(),
                );
            }
        }
    }

    write_flags(&mut out, "Global flags", view.global_flags.iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> AppInfo {
        AppInfo {
            name: "demo".to_string(),
            version: "1.0.0".to_string(),
            description: "A demo".to_string(),
            author: String::new(),
        }
    }

    fn noop(_: &mut Worker) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_application_help_lists_visible_commands() {
        colored::control::set_override(false);
        let mut globals = FlagRegistry::global();
        globals.add(Flag::bool("verbose", "Print more").alias("v"));
        globals.add(Flag::bool("show-bash-completion", "").hidden());
        let commands = vec![
            Command::new("greet").short("Say hello").run(noop),
            Command::new("secret").hidden().run(noop),
        ];
        let info = info();
        let view = HelpView {
            info: &info,
            global_flags: &globals,
            commands: &commands,
            chain: Vec::new(),
        };

        let help = render_help(&view);
        assert!(help.contains("greet"));
        assert!(help.contains("Say hello"));
        assert!(!help.contains("secret"));
        assert!(help.contains("--verbose, -v"));
        assert!(!help.contains("show-bash-completion"));
    }

    #[test]
    fn test_command_help_shows_usage_and_flags() {
        colored::control::set_override(false);
        let globals = FlagRegistry::global();
        let commands = vec![
            Command::new("greet")
                .usage("<name>")
                .arity(1)
                .flag(Flag::string("greeting", "Hello", "Greeting word"))
                .run(noop),
        ];
        let info = info();
        let view = HelpView {
            info: &info,
            global_flags: &globals,
            commands: &commands,
            chain: commands.iter().collect(),
        };

        let help = render_help(&view);
        assert!(help.contains("demo greet [flags] <name>"));
        assert!(help.contains("Greeting word (default: Hello)"));
    }

    #[test]
    fn test_phase_summary_lists_phases_that_ran() {
        let mut worker = Worker::new(
            vec!["deploy".to_string()],
            Default::default(),
            Vec::new(),
            DisplayConfig::default(),
        );
        let command = Command::new("deploy").run(|w| {
            w.fail("target unreachable");
            Ok(())
        });
        worker.run_lifecycle(&command);

        let summary: serde_json::Value =
            serde_json::from_str(&phase_summary(&worker).unwrap()).unwrap();
        let phases = summary.as_array().unwrap();
        let names: Vec<&str> = phases.iter().filter_map(|p| p["phase"].as_str()).collect();
        assert_eq!(names, ["before", "do", "after-failure", "after-always"]);
        assert_eq!(phases[1]["status"], "failed");
        assert_eq!(phases[1]["failure"], "target unreachable");
        assert!(phases[0].get("failure").is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(15)), "15ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
