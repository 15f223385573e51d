//! smux command line entry point

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{self, Command, Stdio};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use smux::context::SessionContext;
use smux::session_file::STDIN_PATH;
use smux::{describe_error, Multiplexer, Orchestrator, RunSummary, SessionFile, SettingsLoader, TmuxMultiplexer};

const USAGE: &str = "\
smux [OPTIONS] <session_file>

Reads a session file of options followed by groups of commands, each group
opened by a line of three or more dashes, and sends every group to its own
tmux pane. Use `-` to read the session file from standard input.

OPTIONS:
    -c, --config <PATH>    Tool settings file
    -d, --debug            Enable debug logging
    -h, -?, --help         Print this help message
    -V, --version          Print version information

SESSION OPTIONS:
    PANES_PER_WINDOW = <n>
        Panes carved into each window (1 to 30). Defaults to the number of
        command groups.
    LAYOUT = <layout>
        even-horizontal, even-vertical, main-horizontal, main-vertical or
        tiled (default).
    NO_CREATE
        Send the commands to the calling pane instead of creating one. Only
        applies to a single command group run from inside tmux.
    USE_THREADS
        Feed every pane concurrently, so a slow pane does not hold up the
        others. Has no effect with a single command group.

COMMANDS:
    Ordinary lines are typed into the pane literally, followed by Enter.
    Lines starting with `#` are comments. Lines starting with `#smux ` are
    directives; a directive ending in `\\` continues on the next line.

    #smux paste-buffer [args]      tmux paste-buffer into this pane
    #smux send-keys [args]         tmux send-keys to this pane, e.g. C-c
    #smux waitForString <string> [pollingInterval] [numLinesToExamine]
    #smux waitForRegex <regex> [pollingInterval] [numLinesToExamine]
        Wait until the text shows up in the last lines of the pane. Only
        reliable for text that stays on screen, such as prompts.
    #smux shell <command>          Run on the host via /bin/sh, with
                                   $window and $pane exported
    #smux sleep <seconds>          Pause this pane

EXAMPLE:
    # This is a comment
    PANES_PER_WINDOW = 2
    LAYOUT = tiled
    ----------
    echo 'This is pane 1'
    ----------
    ssh build-host
    #smux waitForString $
    make

ENVIRONMENT:
    SMUX_CONFIG            Path to the settings file
    SMUX_DEBUG             Enable debug logging (1 or true)
    RUST_LOG               Set logging level (error, warn, info, debug, trace)";

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct AppArgs {
    /// Session file, `-` for stdin
    session_file: Option<PathBuf>,
    /// Settings file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
}

/// What the command line asks for
#[derive(Debug, PartialEq)]
enum Invocation {
    Run(AppArgs),
    Help,
    Version,
}

impl AppArgs {
    /// Parse command line arguments, without the program name
    fn parse_from<I>(args: I) -> Result<Invocation, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or("Missing settings file path")?;
                    app_args.config_path = Some(PathBuf::from(path));
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--help" | "-h" | "-?" => return Ok(Invocation::Help),
                "--version" | "-V" => return Ok(Invocation::Version),
                STDIN_PATH => app_args.set_session_file(arg)?,
                option if option.starts_with('-') => {
                    return Err(format!("Unknown option: {}", option));
                }
                _ => app_args.set_session_file(arg)?,
            }
        }

        if app_args.session_file.is_none() {
            return Err("Missing session file".to_string());
        }
        Ok(Invocation::Run(app_args))
    }

    fn set_session_file(&mut self, path: String) -> Result<(), String> {
        if self.session_file.is_some() {
            return Err(format!("Unexpected argument: {}", path));
        }
        self.session_file = Some(PathBuf::from(path));
        Ok(())
    }
}

fn init_logging(debug: bool) {
    let debug_env = env::var("SMUX_DEBUG").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug || debug_env { "debug" } else { "warn" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = match AppArgs::parse_from(env::args().skip(1)) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Help) => {
            println!("{}", USAGE);
            process::exit(0);
        }
        Ok(Invocation::Version) => {
            println!("{} {}", smux::NAME, smux::VERSION);
            process::exit(0);
        }
        Err(e) => {
            if env::args().len() > 1 {
                eprintln!("smux: {}\n", e);
            }
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    init_logging(args.debug);
    debug!("Starting {} v{}", smux::NAME, smux::VERSION);

    if let Err(e) = run(&args).await {
        let message = match e.downcast_ref::<smux::Error>() {
            Some(err) => describe_error(err),
            None => format!("{:#}", e),
        };
        error!("{}", message);
        eprintln!("smux: {}", message);
        process::exit(1);
    }
}

async fn run(args: &AppArgs) -> anyhow::Result<()> {
    let settings = SettingsLoader::new().load(args.config_path.as_deref())?;

    let session_path = args
        .session_file
        .as_deref()
        .context("no session file given")?;
    let text = SessionFile::read_text(session_path)
        .with_context(|| format!("failed to read session file {}", session_path.display()))?;
    let session = SessionFile::parse(&text)?;

    let mux: Arc<dyn Multiplexer> = Arc::new(TmuxMultiplexer::from_settings(&settings));
    let context = SessionContext::detect(mux.as_ref()).await?;
    let orchestrator = Orchestrator::new(mux, settings, context);

    // NO_CREATE types into the caller's own pane, so hand the work to a
    // background copy and give the shell its prompt back
    if orchestrator.reuses_caller_pane(&session.config, session.pane_count()) && !orchestrator.context().subshell {
        relaunch_in_background(orchestrator.context(), session_path, &text)?;
        return Ok(());
    }

    let SessionFile { config, groups } = session;
    let summary = orchestrator
        .run(&config, groups, None::<fn(&RunSummary)>)
        .await?;
    info!("Done: {} pane(s) fed", summary.targets.len());
    Ok(())
}

/// Re-run this invocation detached from the terminal, passing the caller's
/// pane down through the environment. A session read from stdin is piped to
/// the child since it cannot read it again.
fn relaunch_in_background(context: &SessionContext, session_path: &Path, text: &str) -> anyhow::Result<()> {
    let program = env::current_exe().context("cannot locate the smux executable")?;
    let from_stdin = session_path.as_os_str() == STDIN_PATH;

    let mut child = Command::new(program)
        .args(env::args_os().skip(1))
        .envs(context.relaunch_env())
        .stdin(if from_stdin { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to start the background smux")?;

    if from_stdin {
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                warn!("Failed to hand the session to the background smux: {}", e);
            }
        }
    }

    debug!("Continuing in background process {}", child.id());
    Ok(())
}
