use argh::FromArgs;
use minish::{EditorReader, Interpreter, PlainReader};
use std::io::{self, IsTerminal, Write};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the default log filter.
const LOG_ENV: &str = "MINISH_LOG";

#[derive(FromArgs)]
/// A small interactive shell with echo, exit, type, pwd and cd builtins.
struct Options {
    #[argh(option)]
    /// log filter directive written to stderr, e.g. "debug"; overrides MINISH_LOG
    log: Option<String>,

    #[argh(switch)]
    /// read plain lines from stdin even when it is a terminal
    plain: bool,
}

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_env(LOG_ENV).ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("off"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();

    if let Err(e) = result {
        eprintln!("log system initialization failed: {e}");
    }
}

fn main() {
    let options: Options = argh::from_env();
    init_logging(options.log.as_deref());

    let mut sh = Interpreter::default();
    let code = if !options.plain && io::stdin().is_terminal() {
        match EditorReader::new() {
            Ok(mut reader) => sh.repl(&mut reader),
            Err(err) => {
                warn!(%err, "line editor unavailable, reading plain lines");
                sh.repl(&mut PlainReader::new(io::stdin().lock()))
            }
        }
    } else {
        sh.repl(&mut PlainReader::new(io::stdin().lock()))
    };

    let _ = io::stdout().flush();
    std::process::exit(code);
}
