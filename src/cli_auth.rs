use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use moodwave_server::cli_style::{self, get_styles, CommandGroup, CommandHelp, TableBuilder};
use moodwave_server::{SqliteUserStore, UserManager};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles = get_styles(), about = "Manages Moodwave users and their logins")]
struct CliArgs {
    /// Path to the user database, created if missing.
    #[clap(value_parser = parse_path, default_value = "user.db")]
    pub path: PathBuf,
}

#[derive(Parser)]
#[command(styles = get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates a user with the given handle.
    AddUser { user_handle: String },

    /// Creates a password login for the given user.
    /// Fails if the user already has a password set.
    AddLogin {
        user_handle: String,
        password: String,
    },

    /// Changes the password of a user, fails if no password was set.
    UpdateLogin {
        user_handle: String,
        password: String,
    },

    /// Deletes the password login of a user.
    DeleteLogin { user_handle: String },

    /// Shows the sessions of a given user.
    Show { user_handle: String },

    /// Verifies a password without recording the attempt or creating a session.
    CheckPassword {
        user_handle: String,
        password: String,
    },

    /// Shows all user handles.
    UserHandles,

    /// Shows the path of the current user db.
    Where,

    /// Shows this help.
    Help,

    /// Closes this program.
    Exit,
}

const USER_COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "add-user",
        args: "<handle>",
        description: "Create a user",
    },
    CommandHelp {
        name: "user-handles",
        args: "",
        description: "List all users",
    },
    CommandHelp {
        name: "show",
        args: "<handle>",
        description: "Show a user's sessions",
    },
];

const LOGIN_COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "add-login",
        args: "<handle> <password>",
        description: "Set a first password",
    },
    CommandHelp {
        name: "update-login",
        args: "<handle> <password>",
        description: "Change a password",
    },
    CommandHelp {
        name: "delete-login",
        args: "<handle>",
        description: "Remove a password",
    },
    CommandHelp {
        name: "check-password",
        args: "<handle> <password>",
        description: "Verify a password",
    },
];

const SYSTEM_COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "where",
        args: "",
        description: "Print the db path",
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
            title: "User Management",
            commands: USER_COMMANDS,
        },
        CommandGroup {
            title: "Authentication",
            commands: LOGIN_COMMANDS,
        },
        CommandGroup {
            title: "System",
            commands: SYSTEM_COMMANDS,
        },
    ]);
}

fn format_timestamp(time: Option<SystemTime>) -> String {
    match time.and_then(|t| t.duration_since(UNIX_EPOCH).ok()) {
        Some(duration) => duration.as_secs().to_string(),
        None => "-".to_string(),
    }
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

fn execute_command(
    line: &str,
    user_manager: &UserManager,
    db_path: &str,
) -> CommandExecutionResult {
    if line.trim().is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = match InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str))) {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    cli_style::print_command_echo(line);
    let outcome = match cli.command {
        InnerCommand::AddUser { user_handle } => user_manager
            .add_user(&user_handle)
            .map(|id| cli_style::print_success(&format!("Created {} with id {}", user_handle, id))),
        InnerCommand::AddLogin {
            user_handle,
            password,
        } => user_manager
            .create_password_credentials(&user_handle, &password)
            .map(|_| cli_style::print_success("Password set.")),
        InnerCommand::UpdateLogin {
            user_handle,
            password,
        } => user_manager
            .update_password_credentials(&user_handle, &password)
            .map(|_| cli_style::print_success("Password updated.")),
        InnerCommand::DeleteLogin { user_handle } => user_manager
            .delete_password_credentials(&user_handle)
            .map(|_| cli_style::print_success("Password removed.")),
        InnerCommand::Show { user_handle } => {
            user_manager.get_user_tokens(&user_handle).map(|tokens| {
                cli_style::print_section_header(&user_handle);
                if tokens.is_empty() {
                    cli_style::print_empty_list("No active sessions");
                } else {
                    let mut table = TableBuilder::new(vec!["Token", "Created", "Last used"]);
                    for token in tokens {
                        table.add_row(vec![
                            format!("{}...", &token.value.0[..8.min(token.value.0.len())]),
                            format_timestamp(Some(token.created)),
                            format_timestamp(token.last_used),
                        ]);
                    }
                    table.print();
                }
                cli_style::print_section_footer();
            })
        }
        InnerCommand::CheckPassword {
            user_handle,
            password,
        } => user_manager
            .check_password(&user_handle, &password)
            .map(|correct| {
                if correct {
                    cli_style::print_success("The password provided is correct!");
                } else {
                    cli_style::print_warning("Wrong password.");
                }
            }),
        InnerCommand::UserHandles => user_manager.get_all_user_handles().map(|handles| {
            cli_style::print_section_header("Users");
            if handles.is_empty() {
                cli_style::print_empty_list("No users yet");
            }
            for handle in handles {
                cli_style::print_list_item(&handle, 1);
            }
            cli_style::print_section_footer();
        }),
        InnerCommand::Where => {
            cli_style::print_key_value("User db", db_path);
            Ok(())
        }
        InnerCommand::Help => {
            print_help();
            Ok(())
        }
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    };

    match outcome {
        Ok(()) => CommandExecutionResult::Ok,
        Err(err) => CommandExecutionResult::Error(format!("{}", err)),
    }
}

#[derive(rustyline_derive::Hinter)]
struct CommandNamesHelper {
    commands_names: Vec<String>,
}

impl CommandNamesHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
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
    let db_path = cli_args.path.display().to_string();
    let user_store = SqliteUserStore::new(&cli_args.path)?;
    let user_manager = UserManager::new(Box::new(user_store));

    cli_style::print_welcome(
        "AUTH MANAGEMENT CLI",
        "Connected to user database",
        &[("Database", db_path.as_str()), ("Version", env!("CARGO_PKG_VERSION"))],
    );

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<CommandNamesHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandNamesHelper::new()));

    loop {
        match rl.readline(&cli_style::get_prompt()) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(&line, &user_manager, &db_path) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => cli_style::print_error(&err),
                }
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
    cli_style::print_goodbye("Moodwave Auth CLI");
    Ok(())
}
