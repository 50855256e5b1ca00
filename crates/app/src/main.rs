use std::fmt;
use std::path::{Path, PathBuf};

use archive::ArchiveSource;
use services::{Clock, InputError, QuizPlayer, SessionError, SessionIntent, Transition};
use tokio::io::{AsyncBufReadExt, BufReader};

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingArchive,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingArchive => write!(f, "no archive given (argument or QUIZ_ARCHIVE)"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [play] <archive.zip|url> [--report <path.json>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_ARCHIVE   archive used when none is given");
    eprintln!("  RUST_LOG       log filter (e.g. info, services=debug)");
}

struct Args {
    archive: String,
    report: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut archive = std::env::var("QUIZ_ARCHIVE")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let mut report = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "play" => {}
                "--report" => report = Some(PathBuf::from(require_value(args, "--report")?)),
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => archive = Some(arg),
            }
        }

        let archive = archive.ok_or(ArgsError::MissingArchive)?;
        Ok(Some(Self { archive, report }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Intent(SessionIntent),
    Retry,
    Open(String),
    Quit,
}

impl Command {
    fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Ok(n) = line.parse::<usize>() {
            return n.checked_sub(1).map(|i| Self::Intent(SessionIntent::Select(i)));
        }
        match line {
            "" | "n" => Some(Self::Intent(SessionIntent::SubmitOrAdvance)),
            "b" => Some(Self::Intent(SessionIntent::Back)),
            "s" => Some(Self::Intent(SessionIntent::Skip)),
            "r" => Some(Self::Retry),
            "q" => Some(Self::Quit),
            _ => line
                .strip_prefix("o ")
                .map(|rest| Self::Open(rest.trim().to_owned())),
        }
    }
}

fn show(player: &QuizPlayer) {
    let Some(session) = player.session() else {
        println!("No question set loaded. Use: o <archive>");
        return;
    };

    if session.is_finished() {
        if let Some(report) = player.report() {
            println!("\n{}", terminal::report_screen(&report));
        }
    } else if let Some(view) = player.current_view() {
        println!("\n{}", terminal::question_screen(&view));
    }
}

/// True for the transitions that end an attempt.
fn ends_attempt(transition: &Transition) -> bool {
    matches!(
        transition,
        Transition::Finished | Transition::Graded { finished: true, .. }
    )
}

fn write_report(player: &QuizPlayer, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(report) = player.report() {
        std::fs::write(path, report.to_json()?)?;
        log::info!("report written to {}", path.display());
    }
    Ok(())
}

async fn open(player: &mut QuizPlayer, raw: &str) {
    let loaded = match ArchiveSource::parse(raw) {
        Ok(source) => player.load(&source).await.map(|_| ()),
        Err(err) => Err(SessionError::from(err)),
    };
    if let Err(err) = loaded {
        println!("Cannot open archive: {err}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(args) = Args::parse(&mut argv).inspect_err(|_| print_usage())? else {
        print_usage();
        return Ok(());
    };

    let mut player = QuizPlayer::with_default_fetcher(Clock::default());
    let source = ArchiveSource::parse(&args.archive)?;
    player.load(&source).await?;
    show(&player);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::from_line(&line) else {
            println!("Unknown command: {}", line.trim());
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Open(raw) => open(&mut player, &raw).await,
            Command::Retry => {
                if let Err(err) = player.retry() {
                    println!("{err}");
                }
            }
            Command::Intent(intent) => {
                match player.session_mut().and_then(|s| s.dispatch(intent)) {
                    Ok(transition) if ends_attempt(&transition) => {
                        if let Some(path) = args.report.as_deref() {
                            write_report(&player, path)?;
                        }
                    }
                    Ok(_) => {}
                    Err(SessionError::Input(InputError::NoSelection)) => {
                        println!("No answer selected yet.");
                    }
                    Err(other) => println!("{other}"),
                }
            }
        }
        show(&player);
    }

    player.reset_to_pick();
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
