use std::path::PathBuf;

use activity_portal::app::{AppContext, AppError};
use activity_portal::config::{ClientConfig, ConfigError, DEFAULT_API_BASE_URL};
use activity_portal::features::activities::ActivityQuery;
use activity_portal::net::api::ApiError;
use activity_portal::routing::{Navigation, RouterError};
use activity_portal::state::resource::ResourceState;
use activity_portal::state::session::AuthenticationError;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("login failed: {0}")]
    Login(#[from] AuthenticationError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("navigation failed: {0}")]
    Router(#[from] RouterError),
    #[error("invalid --param `{0}`; expected key=value")]
    InvalidParam(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "activity-portal", about = "Activity portal session and API CLI")]
struct Cli {
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    base_url: String,

    #[arg(long, env = "ACTIVITY_COOKIE_FILE", help = "Cookie jar file; keeps the session between runs")]
    cookie_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Activities {
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
    Interests(InterestsCommand),
    Notices,
    Navigate {
        path: String,
    },
}

#[derive(Args, Debug)]
struct InterestsCommand {
    #[command(subcommand)]
    command: InterestsSubcommand,
}

#[derive(Subcommand, Debug)]
enum InterestsSubcommand {
    List,
    Add { activity_id: i64 },
    Remove { activity_id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(&cli.base_url)?;
    config.cookie_path = cli.cookie_file;
    let mut app = AppContext::from_config(config)?;

    match cli.command {
        Command::Login { email, password } => run_login(&mut app, &email, &password).await,
        Command::Logout => run_logout(&mut app),
        Command::Whoami => run_whoami(&app).await,
        Command::Activities { params } => run_activities(&app, &params).await,
        Command::Interests(interests) => run_interests(&app, interests).await,
        Command::Notices => run_notices(&app).await,
        Command::Navigate { path } => run_navigate(&mut app, &path),
    }
}

async fn run_login(app: &mut AppContext, email: &str, password: &str) -> Result<(), CliError> {
    let response = app.login(email, password).await?;
    print_json(&json!({
        "userId": response.user_id,
        "userName": response.user_name,
        "roleId": response.role_id,
        "route": app.router().current(),
    }))
}

fn run_logout(app: &mut AppContext) -> Result<(), CliError> {
    let navigation = app.logout()?;
    print_json(&json!({ "route": navigation.map(|n| n.landed) }))
}

async fn run_whoami(app: &AppContext) -> Result<(), CliError> {
    app.session().restore_from_cookie();
    if !app.session().is_authenticated() {
        return print_json(&json!({ "authenticated": false }));
    }
    let profile = app.user().fetch_me().await?;
    print_json(&profile)
}

async fn run_activities(app: &AppContext, params: &[String]) -> Result<(), CliError> {
    let query = params.iter().map(|raw| parse_param(raw)).collect::<Result<ActivityQuery, _>>()?;
    app.session().restore_from_cookie();
    app.activities().refresh(&query).await;
    print_json(&settled(app.activities().state())?)
}

async fn run_interests(app: &AppContext, interests: InterestsCommand) -> Result<(), CliError> {
    app.session().restore_from_cookie();
    match interests.command {
        InterestsSubcommand::List => app.interests().fetch().await,
        InterestsSubcommand::Add { activity_id } => app.interests().add(activity_id).await?,
        InterestsSubcommand::Remove { activity_id } => app.interests().remove(activity_id).await?,
    }
    print_json(&settled(app.interests().list().state())?)
}

async fn run_notices(app: &AppContext) -> Result<(), CliError> {
    app.session().restore_from_cookie();
    app.notices().refresh(&()).await;
    print_json(&settled(app.notices().state())?)
}

fn run_navigate(app: &mut AppContext, path: &str) -> Result<(), CliError> {
    let Navigation { requested, landed, redirects } = app.navigate(path)?;
    print_json(&json!({
        "requested": requested,
        "landed": landed,
        "redirects": redirects,
    }))
}

fn parse_param(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), value.to_owned())),
        _ => Err(CliError::InvalidParam(raw.to_owned())),
    }
}

/// Resource data, or the fetch error if the last fetch failed.
fn settled<T>(state: ResourceState<T>) -> Result<T, CliError> {
    match state.error {
        Some(e) => Err(e.into()),
        None => Ok(state.data),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}
