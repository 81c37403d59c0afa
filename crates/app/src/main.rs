use std::fmt;
use std::path::Path;

use quiz_api::ApiError;
use quiz_core::ShuffleOptions;
use quiz_core::model::{
    ALL_FILTER, AttemptId, MaterialFile, QuizDraft, QuizFilter, QuizId, SubjectChoice, SubjectId,
};
use services::{
    AppServices, AttemptError, CancelToken, CatalogError, ClientConfig, CreationError, PageSize,
    Severity,
};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid settings db url: {raw}"),
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

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingArgument { name })
}

fn parse_id<T: std::str::FromStr>(raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidId { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app subjects [--search <text>]");
    eprintln!("  app quizzes  [--search <text>] [--subject <id|all>] [--language <code|all>] [--more]");
    eprintln!("  app show     <quiz_id>");
    eprintln!("  app set-key  <api_key>");
    eprintln!("  app clear-key");
    eprintln!("  app create   --title <t> --subject <id|title> --duration <minutes> --questions <n>");
    eprintln!("               --percentage <p> [--description <d>] [--file <path>]... [--text <t>]");
    eprintln!("  app take     <quiz_id> [--compact] [--no-shuffle]");
    eprintln!("  app result   <quiz_id> <attempt_id>");
    eprintln!("  app share    <quiz_id> [<attempt_id>]");
    eprintln!("  app delete   <quiz_id>");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  QUIZ_API_URL, QUIZ_POLL_INTERVAL_MS, QUIZ_SETTINGS_DB, RUST_LOG");
}

#[derive(Debug)]
enum Command {
    Subjects {
        search: Option<String>,
    },
    Quizzes {
        filter: QuizFilter,
        all_pages: bool,
    },
    Show {
        quiz_id: QuizId,
    },
    SetKey {
        key: String,
    },
    ClearKey,
    Create {
        draft: QuizDraft,
        paths: Vec<String>,
    },
    Take {
        quiz_id: QuizId,
        page_size: PageSize,
        shuffle: bool,
    },
    Result {
        quiz_id: QuizId,
        attempt_id: AttemptId,
    },
    Share {
        quiz_id: QuizId,
        attempt_id: Option<AttemptId>,
    },
    Delete {
        quiz_id: QuizId,
    },
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let Some(name) = args.next() else {
            return Ok(None);
        };
        let args = &mut args;

        let command = match name.as_str() {
            "--help" | "-h" | "help" => return Ok(None),
            "subjects" => {
                let mut search = None;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--search" => search = Some(require_value(args, "--search")?),
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Command::Subjects { search }
            }
            "quizzes" => {
                let (mut search, mut subject, mut language) = (None, None, None);
                let mut all_pages = false;
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--search" => search = Some(require_value(args, "--search")?),
                        "--subject" => {
                            let raw = require_value(args, "--subject")?;
                            if raw != ALL_FILTER {
                                parse_id::<SubjectId>(raw.clone())?;
                            }
                            subject = Some(raw);
                        }
                        "--language" => language = Some(require_value(args, "--language")?),
                        "--more" => all_pages = true,
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Command::Quizzes {
                    filter: QuizFilter::from_inputs(
                        search.as_deref(),
                        subject.as_deref(),
                        language.as_deref(),
                    ),
                    all_pages,
                }
            }
            "show" => Command::Show {
                quiz_id: parse_id(require_arg(args, "quiz_id")?)?,
            },
            "set-key" => Command::SetKey {
                key: require_arg(args, "api_key")?,
            },
            "clear-key" => Command::ClearKey,
            "create" => Self::parse_create(args)?,
            "take" => {
                let quiz_id = parse_id(require_arg(args, "quiz_id")?)?;
                let mut page_size = PageSize::Wide;
                let mut shuffle = true;
                for arg in args.by_ref() {
                    match arg.as_str() {
                        "--compact" => page_size = PageSize::Compact,
                        "--no-shuffle" => shuffle = false,
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Command::Take {
                    quiz_id,
                    page_size,
                    shuffle,
                }
            }
            "result" => Command::Result {
                quiz_id: parse_id(require_arg(args, "quiz_id")?)?,
                attempt_id: parse_id(require_arg(args, "attempt_id")?)?,
            },
            "share" => Command::Share {
                quiz_id: parse_id(require_arg(args, "quiz_id")?)?,
                attempt_id: args.next().map(parse_id).transpose()?,
            },
            "delete" => Command::Delete {
                quiz_id: parse_id(require_arg(args, "quiz_id")?)?,
            },
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(Some(command))
    }

    fn parse_create(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut draft = QuizDraft::default();
        let mut paths = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--title" => draft.title = require_value(args, "--title")?,
                "--subject" => {
                    let raw = require_value(args, "--subject")?;
                    draft.subject = Some(match raw.parse::<SubjectId>() {
                        Ok(id) => SubjectChoice::Existing(id),
                        Err(_) => SubjectChoice::New(raw),
                    });
                }
                "--duration" => draft.duration_minutes = require_value(args, "--duration")?,
                "--questions" => draft.number_of_questions = require_value(args, "--questions")?,
                "--percentage" => draft.success_percentage = require_value(args, "--percentage")?,
                "--description" => draft.description = require_value(args, "--description")?,
                "--file" => paths.push(require_value(args, "--file")?),
                "--text" => draft.text = require_value(args, "--text")?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Command::Create { draft, paths })
    }
}

/// sqlx refuses to open a missing file, so create it (and its parent) first.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn guess_mime(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" | "md" => "text/plain",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => return None,
    };
    Some(mime.to_string())
}

async fn read_material(paths: Vec<String>) -> Result<Vec<MaterialFile>, std::io::Error> {
    let mut files = Vec::with_capacity(paths.len());
    for raw in paths {
        let path = Path::new(&raw);
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| raw.clone(), |name| name.to_string_lossy().into_owned());
        files.push(MaterialFile {
            name,
            mime: guess_mime(path),
            bytes,
        });
    }
    Ok(files)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = Command::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let config = ClientConfig::from_env()?;
    prepare_sqlite_file(&config.settings_db)?;
    let services = AppServices::connect(&config).await?;
    let notifier = services.notifier();

    if services.settings().is_first_login().await? {
        println!("Welcome! Quizzes are generated with your own OpenAI API key.");
        println!("Store it once with `app set-key <key>`; it is only sent when creating a quiz.");
        println!();
    }

    let result = execute(&services, command).await;
    if let Err(err) = &result {
        tracing::warn!(error = %err, "command failed");
        if api_error(err.as_ref()).is_some_and(ApiError::is_transport) {
            notifier.server_error();
        }
    }
    terminal::print_snackbar(&notifier);
    result
}

fn api_error<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a ApiError> {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return Some(api);
    }
    match (
        err.downcast_ref::<CatalogError>(),
        err.downcast_ref::<CreationError>(),
        err.downcast_ref::<AttemptError>(),
    ) {
        (Some(CatalogError::Api(api)), _, _)
        | (_, Some(CreationError::Api(api)), _)
        | (_, _, Some(AttemptError::Api(api))) => Some(api),
        _ => None,
    }
}

async fn execute(
    services: &AppServices,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = services.catalog();
    let notifier = services.notifier();

    match command {
        Command::Subjects { search } => {
            let subjects = catalog.list_subjects(search.as_deref()).await?;
            terminal::print_subjects(&subjects);
        }
        Command::Quizzes { filter, all_pages } => {
            let mut feed = catalog.feed(filter);
            feed.fetch_more().await?;
            while all_pages && feed.has_more() {
                feed.fetch_more().await?;
            }
            terminal::print_quizzes(feed.quizzes(), feed.has_more());
        }
        Command::Show { quiz_id } => {
            let mut rng = rand::rng();
            let quiz = catalog
                .load_quiz(quiz_id, ShuffleOptions::none(), &mut rng)
                .await?;
            terminal::print_quiz(&quiz);
        }
        Command::SetKey { key } => {
            services.settings().set_api_key(&key).await?;
            notifier.show("API key saved", Severity::Success);
        }
        Command::ClearKey => {
            services.settings().clear_api_key().await?;
            notifier.show("API key removed", Severity::Info);
        }
        Command::Create { mut draft, paths } => {
            draft.files = read_material(paths).await?;
            let creation = services.creation();
            let pending = creation.submit(draft).await?;
            println!("Generating {} questions (task {})...", pending.number_of_questions, pending.task_id);

            let token = CancelToken::new();
            let on_interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let mut progress = terminal::ProgressPrinter::default();
            let outcome = creation.follow(&pending, &mut progress, token).await;
            terminal::report_creation(&outcome, &notifier);
        }
        Command::Take {
            quiz_id,
            page_size,
            shuffle,
        } => {
            let options = if shuffle {
                ShuffleOptions::all()
            } else {
                ShuffleOptions::none()
            };
            let quiz = catalog.load_quiz(quiz_id, options, &mut rand::rng()).await?;
            let receipt = terminal::take_quiz(services, quiz, page_size).await?;
            let result = catalog.load_result(receipt.quiz_id, receipt.attempt_id).await?;
            terminal::print_result(&result);
        }
        Command::Result {
            quiz_id,
            attempt_id,
        } => {
            let result = catalog.load_result(quiz_id, attempt_id).await?;
            terminal::print_result(&result);
        }
        Command::Share {
            quiz_id,
            attempt_id,
        } => {
            let already_shared = match attempt_id {
                Some(attempt_id) => catalog.load_result(quiz_id, attempt_id).await?.is_shared,
                None => false,
            };
            if catalog.share_quiz(quiz_id, already_shared).await? {
                notifier.show("Quiz shared", Severity::Success);
            } else {
                notifier.show("Quiz is already shared", Severity::Info);
            }
        }
        Command::Delete { quiz_id } => {
            catalog.delete_quiz(quiz_id).await?;
            notifier.show("Quiz deleted", Severity::Success);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
