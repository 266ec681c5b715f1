use std::{io, path::{Path, PathBuf}, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use clap_verbosity_flag::Verbosity;
use phc_sdk::api::graphql::LambdaGraphQLClient;
use serde_json::{Map, Value};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    verbose: Verbosity
}

#[derive(Args, Debug)]
struct ClientArgs {
    /// Account the requests are made in
    #[clap(long, env = "PHC_ACCOUNT", default_value = "lifeomic")]
    account: String,

    /// User the requests are made as
    #[clap(long, env = "PHC_USER")]
    user: String,

    /// Policy rule attached to every request, as NAME=true or NAME=false
    #[clap(long = "rule", value_parser = parse_rule)]
    rules: Vec<(String, bool)>,

    /// AWS region of the functions, defaults to the region of the environment
    #[clap(long)]
    region: Option<String>
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a GraphQL document against a function and prints the data
    Query {
        /// File holding the GraphQL query or mutation
        #[clap(long)]
        query: PathBuf,

        /// File holding the variables as a JSON object
        #[clap(long)]
        variables: Option<PathBuf>,

        /// Target, as <function>/<path>, e.g. app-store-service:deployed/graphql
        #[clap(long)]
        address: String,

        #[clap(flatten)]
        client: ClientArgs
    },

    /// Reads and deletes App Store listings
    #[clap(subcommand)]
    AppStore(AppStoreCommand),

    /// Reads Marketplace modules
    #[clap(subcommand)]
    Marketplace(MarketplaceCommand),

    /// Prints shell completions
    Completions {
        shell: Shell
    }
}

#[derive(Subcommand, Debug)]
enum AppStoreCommand {
    Get {
        id: String,

        #[clap(flatten)]
        client: ClientArgs
    },
    Delete {
        id: String,

        #[clap(flatten)]
        client: ClientArgs
    }
}

#[derive(Subcommand, Debug)]
enum MarketplaceCommand {
    Module {
        id: String,

        #[clap(long)]
        version: Option<String>,

        #[clap(flatten)]
        client: ClientArgs
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    log::info!("Running command: {:?}", cli.command);

    match run(cli.command).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Query { query, variables, address, client } => {
            let query = tokio::fs::read_to_string(&query)
                .await
                .with_context(|| format!("Error reading query file {}", query.display()))?;

            let variables = match variables {
                Some(path) => read_variables(&path).await?,
                None => Map::new()
            };

            let data = build_client(client).await
                .execute(&address, &query, &variables)
                .await?;

            println!("{}", serde_json::to_string_pretty(&data)?);
        },
        Command::AppStore(AppStoreCommand::Get { id, client }) => {
            let client = build_client(client).await;
            let listing = client.app_store().get_listing(&id).await?;

            println!("{listing}");
        },
        Command::AppStore(AppStoreCommand::Delete { id, client }) => {
            let client = build_client(client).await;
            client.app_store().delete_listing(&id).await?;

            println!("Deleted App Store listing {id}");
        },
        Command::Marketplace(MarketplaceCommand::Module { id, version, client }) => {
            let client = build_client(client).await;
            let module = client.marketplace()?
                .get_app_tile_module(&id, version.as_deref())
                .await?;

            match module {
                Some(module) => println!("{module}"),
                None => bail!("Module {id} was not found")
            }
        },
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "phc", &mut io::stdout());
        }
    }

    Ok(())
}

async fn build_client(args: ClientArgs) -> LambdaGraphQLClient {
    args.rules
        .iter()
        .fold(LambdaGraphQLClient::builder(&args.account, &args.user), |builder, (name, allowed)| builder.rule(name, *allowed))
        .build_from_env(args.region)
        .await
}

async fn read_variables(path: &Path) -> Result<Map<String, Value>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Error reading variables file {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Variables file {} must hold a JSON object", path.display()))
}

fn parse_rule(rule: &str) -> Result<(String, bool), String> {
    let (name, allowed) = rule.split_once('=')
        .ok_or_else(|| format!("Expected NAME=true or NAME=false, got {rule}"))?;

    let allowed = allowed.parse::<bool>()
        .map_err(|_| format!("Rule {name} must be true or false, got {allowed}"))?;

    Ok((name.to_string(), allowed))
}
