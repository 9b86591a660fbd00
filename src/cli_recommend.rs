use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use moodwave_server::cli_style::{self, get_styles, CommandGroup, CommandHelp};
use moodwave_server::client::{
    build_view, print_view, HttpRecommendationsApi, Library, LibrarySong,
    RecommendationController, RecommendationStore, RecommendationsApi,
};
use moodwave_server::recommendation::RecommendationCategory;

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

#[derive(Parser, Debug)]
#[command(styles = get_styles(), about = "Interactive AI recommendations against a Moodwave server")]
struct CliArgs {
    /// Base URL of the server.
    #[clap(long, default_value = "http://localhost:3001")]
    pub server_url: String,

    /// User handle to log in with.
    #[clap(long)]
    pub user: String,

    /// Password for the user.
    #[clap(long, env = "MOODWAVE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// JSON file with the song library. The default placeholder library is
    /// used when omitted or empty.
    #[clap(long)]
    pub songs: Option<PathBuf>,
}

#[derive(Parser)]
#[command(styles = get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Switches to the mood, time or activity category.
    Category { category: String },

    /// Requests recommendations for an option, by name or list number.
    Pick { option: String },

    /// Clears the error banner.
    Dismiss,

    /// Goes back to the option picker.
    Again,

    /// Lists the current recommendations as a play queue.
    Play,

    /// Shows the categories the server offers.
    Categories,

    /// Shows the current state.
    Show,

    /// Shows this help.
    Help,

    /// Closes this program.
    Exit,
}

const RECOMMENDATION_COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "category",
        args: "<mood|time|activity>",
        description: "Switch category",
    },
    CommandHelp {
        name: "pick",
        args: "<option|number>",
        description: "Get recommendations",
    },
    CommandHelp {
        name: "dismiss",
        args: "",
        description: "Clear the error",
    },
    CommandHelp {
        name: "again",
        args: "",
        description: "Try another option",
    },
    CommandHelp {
        name: "play",
        args: "",
        description: "Queue all recommendations",
    },
];

const SYSTEM_COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "categories",
        args: "",
        description: "List server categories",
    },
    CommandHelp {
        name: "show",
        args: "",
        description: "Redraw the panel",
    },
    CommandHelp {
        name: "help",
        args: "",
        description: "Show this help",
    },
    CommandHelp {
        name: "exit",
        args: "",
        description: "Quit",
    },
];

fn print_help() {
    cli_style::print_help(&[
        CommandGroup {
            title: "Recommendations",
            commands: RECOMMENDATION_COMMANDS,
        },
        CommandGroup {
            title: "System",
            commands: SYSTEM_COMMANDS,
        },
    ]);
}

fn load_library(path: Option<&PathBuf>) -> Result<Library> {
    let songs: Vec<LibrarySong> = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read song library {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse song library {:?}", path))?
        }
        None => Vec::new(),
    };
    Ok(Library::or_defaults(songs))
}

/// Accepts an option name (any case) or its 1-based number in the picker.
fn resolve_option(category: RecommendationCategory, input: &str) -> Option<&'static str> {
    let options = category.options();
    if let Ok(n) = input.trim().parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input.trim()))
        .copied()
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn show(controller: &RecommendationController) {
    let state = controller.store().snapshot();
    print_view(&build_view(&state, controller.library()));
}

fn execute_command(
    line: &str,
    controller: &RecommendationController,
    api: &dyn RecommendationsApi,
    runtime: &tokio::runtime::Runtime,
) -> CommandExecutionResult {
    if line.trim().is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());
    let cli = match InnerCli::try_parse_from(
        std::iter::once(" ").chain(args.iter().map(String::as_str)),
    ) {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    cli_style::print_command_echo(line);
    match cli.command {
        InnerCommand::Category { category } => match category.parse() {
            Ok(category) => {
                controller.select_category(category);
                show(controller);
            }
            Err(err) => return CommandExecutionResult::Error(err),
        },
        InnerCommand::Pick { option } => {
            let category = controller.store().snapshot().category;
            let Some(option) = resolve_option(category, &option) else {
                return CommandExecutionResult::Error(format!(
                    "'{}' is not an option of {}",
                    option,
                    category.label()
                ));
            };
            cli_style::print_info(moodwave_server::client::LOADING_MESSAGE);
            runtime.block_on(controller.select_option(option));
            show(controller);
        }
        InnerCommand::Dismiss => {
            controller.store().dismiss_error();
            show(controller);
        }
        InnerCommand::Again => {
            controller.store().try_another();
            show(controller);
        }
        InnerCommand::Play => {
            let queue = controller.play_all();
            cli_style::print_section_header("Play queue");
            if queue.is_empty() {
                cli_style::print_empty_list("Nothing to play");
            }
            for (i, song) in queue.iter().enumerate() {
                cli_style::print_track(
                    i + 1,
                    &song.title,
                    &song.artist,
                    Some(song.audio_url.as_str()),
                );
            }
            cli_style::print_section_footer();
        }
        InnerCommand::Categories => match runtime.block_on(api.fetch_categories()) {
            Ok(categories) => {
                cli_style::print_section_header("Categories");
                for category in categories {
                    let line = format!(
                        "{} ({}): {}",
                        category.label,
                        category.id,
                        category.options.join(", ")
                    );
                    cli_style::print_list_item(&line, 1);
                }
                cli_style::print_section_footer();
            }
            Err(err) => return CommandExecutionResult::Error(err.to_string()),
        },
        InnerCommand::Show => show(controller),
        InnerCommand::Help => print_help(),
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandNamesHelper {
    commands_names: Vec<String>,
}

impl CommandNamesHelper {
    fn new() -> Self {
        let commands_names = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();
        CommandNamesHelper { commands_names }
    }
}

impl Completer for CommandNamesHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::new()));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect();
        Ok((0, matches))
    }
}

impl Highlighter for CommandNamesHelper {}
impl Validator for CommandNamesHelper {}
impl Helper for CommandNamesHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let runtime = tokio::runtime::Runtime::new()?;

    let library = load_library(cli_args.songs.as_ref())?;
    let mut http_api = HttpRecommendationsApi::new(&cli_args.server_url);
    runtime
        .block_on(http_api.login(&cli_args.user, &cli_args.password))
        .with_context(|| format!("Could not log in to {}", cli_args.server_url))?;
    let api: Arc<dyn RecommendationsApi> = Arc::new(http_api);

    let song_count = library.len().to_string();
    cli_style::print_welcome(
        "AI RECOMMENDATIONS",
        "Logged in",
        &[
            ("Server", cli_args.server_url.as_str()),
            ("User", cli_args.user.as_str()),
            ("Songs", song_count.as_str()),
        ],
    );

    let controller =
        RecommendationController::new(Arc::new(RecommendationStore::new()), api.clone(), library);
    show(&controller);

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<CommandNamesHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandNamesHelper::new()));

    loop {
        match rl.readline(&cli_style::get_prompt()) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(&line, &controller, api.as_ref(), &runtime) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => cli_style::print_error(&err),
                }
                cli_style::flush();
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                cli_style::print_error(&format!("{:?}", e));
                break;
            }
        }
    }
    cli_style::print_goodbye("Moodwave Recommendations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_options_by_name_or_number() {
        assert_eq!(resolve_option(RecommendationCategory::Mood, "2"), Some("Sad"));
        assert_eq!(
            resolve_option(RecommendationCategory::Activity, "party"),
            Some("Party")
        );
        assert_eq!(resolve_option(RecommendationCategory::Time, "0"), None);
        assert_eq!(resolve_option(RecommendationCategory::Time, "99"), None);
        assert_eq!(resolve_option(RecommendationCategory::Time, "Brunch"), None);
    }
}
