use clap::{Parser, Subcommand};
use colored::*;
use safely::{BoxError, SafeScenario, SafelyOptions};

const DEMO_SCENARIO: SafeScenario = SafeScenario::from_static(
    "Demonstrate a guarded call that fails on purpose",
    "@safely-demo",
);

/// safely-demo - run each fault path of `safely` in a real process
#[derive(Parser)]
#[command(name = "safely-demo", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Print verbose logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Panic inside an interception boundary and report it
    Intercept {
        /// Panic message
        #[arg(short, long, default_value = "boom")]
        reason: String,
    },

    /// Install an uncaught handler, then panic on the main thread
    Uncaught {
        /// Panic message
        #[arg(short, long, default_value = "fatal")]
        reason: String,
        /// Clear the handler again before panicking
        #[arg(long)]
        clear: bool,
    },

    /// Run a failing closure through `safely` with error logging on
    Scenario {
        /// Error message returned by the closure
        #[arg(short, long, default_value = "broken pipe")]
        reason: String,
        /// Panic instead of returning an error
        #[arg(long)]
        panic: bool,
    },

    /// Observe SIGABRT, then let it terminate the process
    #[cfg(unix)]
    Signal,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .without_time()
        .init();
    safely::init();

    match cli.command {
        Commands::Intercept { reason } => intercept(reason),
        Commands::Uncaught { reason, clear } => uncaught(reason, clear),
        Commands::Scenario { reason, panic } => scenario(reason, panic),
        #[cfg(unix)]
        Commands::Signal => signal(),
    }
}

fn intercept(reason: String) -> anyhow::Result<()> {
    match safely::try_intercept(|| panic!("{}", reason)) {
        Some(captured) => {
            println!(
                "{} {}",
                "intercepted:".green().bold(),
                captured.reason().unwrap_or("unknown")
            );
            tracing::debug!("{:#}", captured);
            Ok(())
        }
        None => Err(anyhow::anyhow!("the panic was not intercepted")),
    }
}

fn uncaught(reason: String, clear: bool) -> anyhow::Result<()> {
    SafelyOptions::set_on_uncaught_exception(|captured| {
        eprintln!(
            "{} {}",
            "uncaught handler:".red().bold(),
            captured.reason().unwrap_or("unknown")
        );
    });
    if clear {
        SafelyOptions::clear_on_uncaught_exception();
    }
    panic!("{}", reason);
}

fn scenario(reason: String, panic: bool) -> anyhow::Result<()> {
    SafelyOptions::builder().log_errors(true).install();

    let error = safely::safely(&DEMO_SCENARIO, reason, |reason| -> Result<(), BoxError> {
        if panic {
            panic!("{}", reason);
        }
        Err(reason.into())
    });

    match error {
        Some(error) => {
            println!("{} {}", "safe call failed:".yellow().bold(), error);
            Ok(())
        }
        None => Err(anyhow::anyhow!("the safe call unexpectedly succeeded")),
    }
}

#[cfg(unix)]
fn signal() -> anyhow::Result<()> {
    SafelyOptions::set_on_signals(|fault| {
        for part in [b"signal handler: ".as_slice(), fault.name().as_bytes(), b"\n"] {
            // SAFETY: write(2) is async-signal-safe and the buffers are static.
            unsafe {
                libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len());
            }
        }
    });
    std::process::abort();
}
