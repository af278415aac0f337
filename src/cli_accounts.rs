use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;

use cli_style::{
    get_prompt, get_styles, print_banner, print_command_echo, print_error, print_favorites,
    print_goodbye, print_help, print_location, print_notifications, print_success,
    print_unread_count, print_user_card, print_warning, CommandHelp,
};
use estate_accounts::{
    config::{AppConfig, CliConfig, FileConfig, StorageBackend},
    user::{EmailPolicy, UserSettings},
    AuthOutcome, JsonFileKeyValueStore, Locale, NewNotification, ProfileUpdate, Registration,
    UserStore,
};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let given_path = PathBuf::from(s);
    if given_path.is_absolute() {
        return Ok(given_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(given_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path of the account store (JSON file or SQLite database).
    #[clap(value_parser = parse_path)]
    pub path: Option<PathBuf>,

    /// Storage backend.
    #[clap(long, value_enum, default_value_t = StorageBackend::JsonFile)]
    pub backend: StorageBackend,

    /// Path to a TOML config file, its values override the arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// How emails are compared on registration and login.
    #[clap(long, value_enum, default_value_t = EmailPolicy::Exact)]
    pub email_policy: EmailPolicy,

    /// Give new accounts the welcome notifications.
    #[clap(long)]
    pub welcome_notifications: bool,

    /// Language of the messages shown.
    #[clap(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,
}

#[derive(Parser)]
#[command(styles=get_styles(), name = "", disable_help_subcommand = true)]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates an account and logs into it.
    Register {
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Starts a session for the given credentials.
    Login { email: String, password: String },

    /// Ends the current session.
    Logout,

    /// Shows the logged in user.
    Whoami,

    /// Edits name, phone, avatar or settings of the logged in user.
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, conflicts_with = "clear_phone")]
        phone: Option<String>,
        #[arg(long)]
        clear_phone: bool,
        #[arg(long, conflicts_with = "clear_avatar")]
        avatar: Option<String>,
        #[arg(long)]
        clear_avatar: bool,
        #[arg(long)]
        email_notifications: Option<bool>,
        #[arg(long)]
        price_alerts: Option<bool>,
        #[arg(long)]
        new_listings: Option<bool>,
    },

    /// Adds a property to the favorites.
    AddFavorite { property_id: String },

    /// Removes a property from the favorites.
    RemoveFavorite { property_id: String },

    /// Lists the favorite properties.
    Favorites,

    /// Sends a notification to the logged in user.
    Notify {
        notification_type: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        title_en: String,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long, default_value = "")]
        message_en: String,
        #[arg(long)]
        link: Option<String>,
    },

    /// Lists the notifications, newest first.
    Notifications,

    /// Marks a notification as read.
    Read { notification_id: String },

    /// Shows the number of unread notifications.
    Unread,

    /// Replaces the notifications with the welcome set.
    Welcome,

    /// Shows where the accounts are stored.
    Where,

    /// Shows this help.
    Help,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

struct ReplContext {
    locale: Locale,
    backend: String,
    location: String,
}

fn localized(locale: Locale, arabic: &str, english: &str) -> String {
    match locale {
        Locale::Ar => arabic.to_string(),
        Locale::En => english.to_string(),
    }
}

fn report(outcome: &AuthOutcome, locale: Locale) -> CommandExecutionResult {
    let message = localized(locale, &outcome.message, &outcome.message_en);
    if outcome.success {
        print_success(&message);
        CommandExecutionResult::Ok
    } else {
        CommandExecutionResult::Error(message)
    }
}

fn execute_command(line: String, store: &UserStore, ctx: &ReplContext) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    let cli = match cli {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    print_command_echo(&line);
    match cli.command {
        InnerCommand::Register {
            first_name,
            last_name,
            email,
            password,
            phone,
        } => {
            let mut registration = Registration::new(first_name, last_name, email, password);
            registration.phone = phone;
            return report(
                &AuthOutcome::registration(&store.register(registration)),
                ctx.locale,
            );
        }
        InnerCommand::Login { email, password } => {
            return report(
                &AuthOutcome::login(&store.login(&email, &password)),
                ctx.locale,
            );
        }
        InnerCommand::Logout => {
            if let Err(err) = store.logout() {
                return CommandExecutionResult::Error(format!("{}", err));
            }
            print_success(&localized(ctx.locale, "تم تسجيل الخروج", "Logged out"));
        }
        InnerCommand::Whoami => match store.current_user() {
            Some(user) => print_user_card(&user),
            None => print_warning(&localized(ctx.locale, "لم يتم تسجيل الدخول", "Not logged in")),
        },
        InnerCommand::UpdateProfile {
            first_name,
            last_name,
            phone,
            clear_phone,
            avatar,
            clear_avatar,
            email_notifications,
            price_alerts,
            new_listings,
        } => {
            let settings = if email_notifications.is_some()
                || price_alerts.is_some()
                || new_listings.is_some()
            {
                let current = store
                    .current_user()
                    .map(|user| user.settings)
                    .unwrap_or_default();
                Some(UserSettings {
                    email_notifications: email_notifications
                        .unwrap_or(current.email_notifications),
                    price_alerts: price_alerts.unwrap_or(current.price_alerts),
                    new_listings: new_listings.unwrap_or(current.new_listings),
                })
            } else {
                None
            };
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone: if clear_phone { Some(None) } else { phone.map(Some) },
                avatar: if clear_avatar {
                    Some(None)
                } else {
                    avatar.map(Some)
                },
                settings,
            };
            if update.is_empty() {
                return CommandExecutionResult::Error("Nothing to update.".to_string());
            }
            return report(
                &AuthOutcome::profile_update(&store.update_profile(update)),
                ctx.locale,
            );
        }
        InnerCommand::AddFavorite { property_id } => {
            return report(
                &AuthOutcome::favorites_change(true, &store.add_to_favorites(&property_id)),
                ctx.locale,
            );
        }
        InnerCommand::RemoveFavorite { property_id } => {
            return report(
                &AuthOutcome::favorites_change(false, &store.remove_from_favorites(&property_id)),
                ctx.locale,
            );
        }
        InnerCommand::Favorites => print_favorites(&store.favorites()),
        InnerCommand::Notify {
            notification_type,
            title,
            title_en,
            message,
            message_en,
            link,
        } => {
            let mut notification = NewNotification::new(notification_type)
                .with_title(title, title_en)
                .with_message(message, message_en);
            notification.link = link;
            match store.add_notification(notification) {
                Ok(created) => print_success(&format!("Notification {} added", created.id)),
                Err(err) => {
                    return CommandExecutionResult::Error(localized(
                        ctx.locale,
                        &err.message(),
                        &err.message_en(),
                    ))
                }
            }
        }
        InnerCommand::Notifications => print_notifications(&store.notifications(), ctx.locale),
        InnerCommand::Read { notification_id } => {
            match store.mark_notification_read(&notification_id) {
                Ok(true) => print_success("Marked as read"),
                Ok(false) => print_warning(&format!("No notification {}", notification_id)),
                Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
            }
        }
        InnerCommand::Unread => print_unread_count(store.unread_notification_count()),
        InnerCommand::Welcome => {
            let Some(user) = store.current_user() else {
                return CommandExecutionResult::Error(localized(
                    ctx.locale,
                    "يجب تسجيل الدخول أولاً",
                    "Please log in first",
                ));
            };
            match store.create_welcome_notifications(&user.id) {
                Ok(notifications) => {
                    print_success(&format!("{} notifications created", notifications.len()))
                }
                Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
            }
        }
        InnerCommand::Where => print_location(&ctx.backend, &ctx.location),
        InnerCommand::Help => {
            let commands: Vec<CommandHelp> = InnerCli::command()
                .get_subcommands()
                .map(|sc| CommandHelp {
                    name: sc.get_name().to_string(),
                    description: sc.get_about().map(|a| a.to_string()).unwrap_or_default(),
                })
                .collect();
            print_help(&commands);
        }
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct AccountsHelper {
    commands_names: Vec<String>,
}

impl AccountsHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        AccountsHelper { commands_names }
    }
}

impl Completer for AccountsHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for AccountsHelper {}
impl Validator for AccountsHelper {}
impl Helper for AccountsHelper {}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli_args = CliArgs::parse();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let storage_path = match (cli_args.backend, cli_args.path) {
        (_, Some(path)) => Some(path),
        (StorageBackend::JsonFile, None) => JsonFileKeyValueStore::infer_path(),
        (_, None) => None,
    };

    let cli_config = CliConfig {
        storage_backend: cli_args.backend,
        storage_path,
        email_policy: cli_args.email_policy,
        welcome_notifications: cli_args.welcome_notifications,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)
        .context("Could not resolve the account store, please specify its path explicitly.")?;
    let store = app_config.build_user_store()?;

    let location = app_config
        .storage_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(in memory)".to_string());
    let ctx = ReplContext {
        locale: cli_args.locale,
        backend: format!("{:?}", app_config.storage_backend),
        location,
    };

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<AccountsHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(AccountsHelper::new()));
    let _ = rl.clear_screen();

    print_banner(&ctx.backend, &ctx.location);

    loop {
        let email = store.current_user().map(|user| user.email);
        let readline = rl.readline(&get_prompt(email.as_deref()));

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &store, &ctx) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        print_error(&err);
                        continue;
                    }
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
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    print_goodbye();
    Ok(())
}
