//! progcalc - programmable RPN calculator
//!
//! Usage:
//!   progcalc                      # Interactive session
//!   progcalc -e "1 2 3 collect"   # Evaluate lines and print the stack
//!
//! Every line is a list of numbers and words, run left to right against
//! one stack that lives for the whole session. Type `help` for the
//! function editing commands.

mod editor;
mod host;

use clap::Parser as ClapParser;
use host::{Host, Reply, render_stack};
use progcalc_runtime::{CalcConfig, Calculator, DefinitionStore, JsonFileStore};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::debug;

#[derive(ClapParser)]
#[command(name = "progcalc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Programmable RPN calculator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for saved functions and history
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Annotated definitions file replacing the built-in library
    #[arg(long)]
    builtins: Option<PathBuf>,

    /// Don't read or write line history
    #[arg(long)]
    no_history: bool,

    /// Evaluate a line and exit (repeatable)
    #[arg(short, long = "eval", value_name = "LINE")]
    eval: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let store = config.store();
    let calc = match Calculator::initialize(&config, &store) {
        Ok(calc) => calc,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let mut host = Host::new(calc, store);

    if !args.eval.is_empty() {
        let ok = run_lines(&mut host, &args.eval);
        println!("{}", render_stack(host.stack()));
        process::exit(if ok { 0 } else { 1 });
    }

    repl_loop(&mut host, config.history_path());
}

fn load_config(args: &Args) -> Result<CalcConfig, progcalc_runtime::ConfigError> {
    let mut config = match &args.config {
        Some(path) => CalcConfig::load(path)?,
        None => CalcConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(path) = &args.builtins {
        config = config.with_builtin_defs(path);
    }
    if args.no_history {
        config = config.with_history(false);
    }
    Ok(config)
}

/// Evaluate each line in turn; false if any line failed
fn run_lines<S: DefinitionStore>(host: &mut Host<S>, lines: &[String]) -> bool {
    let mut ok = true;
    for line in lines {
        match host.handle_line(line) {
            Reply::Evaluated(outcome) => {
                if !outcome.is_done() {
                    eprintln!("{}", outcome);
                    ok = false;
                }
            }
            Reply::Message(msg) => println!("{}", msg),
            Reply::Error(msg) => {
                eprintln!("{}", msg);
                ok = false;
            }
            Reply::Edit(_) => {
                eprintln!("edit-func needs an interactive session");
                ok = false;
            }
            Reply::Quit => break,
        }
    }
    ok
}

/// Interactive loop
fn repl_loop(host: &mut Host<JsonFileStore>, history_file: Option<PathBuf>) {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error initializing readline: {}", e);
            process::exit(1);
        }
    };

    if let Some(ref path) = history_file {
        let _ = rl.load_history(path);
    }

    println!("progcalc. Type help for commands, quit to exit.\n");

    loop {
        let prompt = match host.editing_name() {
            Some(name) => format!("progcalc [{}]> ", name),
            None => "progcalc> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let reply = match host.handle_line(&line) {
                    Reply::Edit(text) => match editor::edit_text(&text) {
                        Ok(edited) => host.replace_buffer(edited),
                        Err(e) => Reply::Error(e.to_string()),
                    },
                    reply => reply,
                };

                match reply {
                    Reply::Evaluated(outcome) => {
                        println!("{}", outcome);
                        println!("{}", render_stack(host.stack()));
                    }
                    Reply::Message(msg) => println!("{}", msg),
                    Reply::Error(msg) => eprintln!("{}", msg),
                    Reply::Edit(_) => {}
                    Reply::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_file {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = rl.save_history(path) {
            debug!("could not save history to {}: {}", path.display(), e);
        }
    }
}
