// src/bin/phaserun-demo.rs

use anyhow::{Result, anyhow};
use colored::*;
use phaserun::{Application, Command, Flag, Worker};
use std::thread;
use std::time::Duration;

// --- Handlers ---

fn greet(w: &mut Worker) -> Result<()> {
    let name = w.arg(0).ok_or_else(|| anyhow!("greet needs a name"))?;
    let greeting = w.flags().value("greeting");
    let line = format!("{}, {}!", greeting, name);
    if w.flags().bool("loud") {
        println!("{}", line.to_uppercase());
    } else {
        println!("{}", line);
    }
    Ok(())
}

/// Fans out one task per source and sums the sizes they report.
fn fetch(w: &mut Worker) -> Result<()> {
    let fail_on = w.flags().value("fail-on").to_string();
    let delay = w.flag("delay-ms").and_then(|f| f.as_i64()).unwrap_or(0);
    let sources: Vec<String> = w.args().to_vec();

    for source in &sources {
        let source_name = source.clone();
        let fail = fail_on == *source;
        w.task(source, move |task| {
            thread::sleep(Duration::from_millis(delay.unsigned_abs()));
            if fail {
                task.fail(format!("source {} is unreachable", source_name));
                return;
            }
            if let Err(e) = task.set_json_payload(&source_name.len()) {
                task.fail(e);
            }
        })?;
    }

    let mut total = 0_usize;
    for source in &sources {
        let payload = w.wait_task_payload_from(source)?;
        if payload.is_empty() {
            continue;
        }
        let size: usize = serde_json::from_slice(&payload)?;
        println!("{} {} ({} bytes)", "→".blue(), source.green(), size);
        total += size;
    }
    w.wait();
    println!("fetched {} byte(s) from {} source(s)", total, sources.len());
    Ok(())
}

fn remote_add(w: &mut Worker) -> Result<()> {
    let name = w.arg(0).unwrap_or_default();
    let url = w.arg(1).unwrap_or_default();
    if w.flags().bool("force") {
        println!("replacing remote {} -> {}", name.cyan(), url);
    } else {
        println!("adding remote {} -> {}", name.cyan(), url);
    }
    Ok(())
}

fn report_failure(w: &mut Worker) -> Result<()> {
    eprintln!("{}", format!("cleaning up after {}", w.command_path().join(" ")).yellow());
    Ok(())
}

// --- Application Definition ---

fn build_app() -> Application {
    let mut app = Application::new("phaserun-demo")
        .version(env!("CARGO_PKG_VERSION"))
        .description("Demonstrates command resolution and the phase/task lifecycle.");

    app.add_command(
        Command::new("greet")
            .short("Greet someone")
            .usage("<name>")
            .arity(1)
            .flag(Flag::string("greeting", "Hello", "Greeting word").alias("g"))
            .flag(Flag::bool("loud", "Shout the greeting"))
            .run(greet),
    );

    app.add_command(
        Command::new("fetch")
            .short("Fetch sources concurrently")
            .usage("<source>...")
            .category("Tasks")
            .arity(8)
            .flag(Flag::string("fail-on", "", "Make the task for this source fail"))
            .flag(Flag::numeric("delay-ms", 0.0, "Delay of each task"))
            .run(fetch)
            .after_failure(report_failure)
            .after_always(|w| {
                log::info!("fetch finished after {:?}", w.elapsed());
                Ok(())
            }),
    );

    app.add_command(
        Command::new("remote")
            .short("Manage remotes")
            .subcommand(
                Command::new("add")
                    .short("Add a remote")
                    .usage("<name> <url>")
                    .arity(2)
                    .flag(Flag::bool("force", "Replace an existing remote").alias("f"))
                    .run(remote_add),
            )
            .subcommand(Command::new("list").short("List remotes").run(|_| {
                println!("origin");
                Ok(())
            })),
    );

    app.add_command(
        Command::new("check")
            .short("Always fails")
            .flag(Flag::option("level", &["warn", "error"], "error", "Failure level"))
            .run(|w| {
                w.fail(format!("check failed at level {}", w.flags().value("level")));
                Ok(())
            })
            .after_failure(report_failure),
    );

    app
}

fn main() {
    let mut app = build_app();
    let status = app.run_from_env();
    std::process::exit(status.code());
}
