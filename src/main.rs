use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use serde::Serialize;
use std::sync::Arc;

mod auth;
mod config;
mod error;
mod http_client;
mod services;

use auth::{AuthManager, TokenStore};
use config::{Config, GlobalArgs};
use http_client::ApiClient;
use services::{barcode, bottles, recipes, session, spirit_types};

/// Bottles - command-line client for the bar inventory API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session tokens
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Register a new account
    Register {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Drop the local session
    Logout,
    /// Manage bottles
    Bottles {
        #[command(subcommand)]
        command: BottleCommand,
    },
    /// Manage cocktail recipes
    Recipes {
        #[command(subcommand)]
        command: RecipeCommand,
    },
    /// Manage spirit types
    Spirits {
        #[command(subcommand)]
        command: SpiritCommand,
    },
    /// Barcode registry
    Barcode {
        #[command(subcommand)]
        command: BarcodeCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BottleCommand {
    /// List all bottles, or search by name
    List {
        /// Filter by (partial) bottle name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show one bottle
    Get { id: u64 },
    /// Register a new bottle
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        brand: Option<String>,
        #[arg(short, long)]
        flavor_profile: Option<String>,
        #[arg(short, long)]
        material: Option<String>,
        #[arg(short, long)]
        capacity_ml: Option<u32>,
    },
    /// Delete a bottle
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
enum RecipeCommand {
    List,
    Get {
        id: u64,
    },
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        instructions: String,
        /// Ingredient list, free-form text
        #[arg(long)]
        ingredients: String,
        /// Comma-separated bottle ids, e.g. "1,4"
        #[arg(long)]
        bottle_ids: String,
    },
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
enum SpiritCommand {
    List,
    Add { name: String },
}

#[derive(Subcommand, Debug)]
enum BarcodeCommand {
    /// Look a barcode up in the global registry
    Lookup { barcode: String },
    /// Register bottle metadata for a barcode
    Register {
        #[arg(long)]
        barcode: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        brand: Option<String>,
        #[arg(short, long)]
        flavor_profile: Option<String>,
        #[arg(short, long)]
        capacity_ml: Option<u32>,
        #[arg(short, long)]
        spirit_type_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_args(&cli.global)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli.command, config).await
}

async fn run(command: Command, config: Config) -> Result<()> {
    let endpoints = config.endpoints();

    let store = Arc::new(TokenStore::open(&config.token_db_file)?);
    let auth = Arc::new(AuthManager::new(
        store,
        endpoints.auth_refresh(),
        config.refresh_threshold,
    )?);
    let client = ApiClient::new(
        auth.clone(),
        config.http_request_timeout,
        config.http_max_retries,
    )?;

    match command {
        Command::Login { username } => {
            let username = prompt_username(username)?;
            let password = Password::new().with_prompt("Password").interact()?;
            session::login(&auth, &endpoints, username, password).await?;
            println!("Logged in.");
        }

        Command::Register { username } => {
            let username = prompt_username(username)?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            let user = session::register(&endpoints, username, password).await?;
            println!("Registered '{}'. Please log in.", user.username);
        }

        Command::Logout => {
            session::logout(&auth)?;
            println!("Logged out.");
        }

        Command::Bottles { command } => match command {
            BottleCommand::List { name: Some(name) } => {
                print_json(&bottles::fetch_bottles_by_name(&client, &endpoints, &name).await?)?;
            }
            BottleCommand::List { name: None } => {
                print_json(&bottles::fetch_all_bottles(&client, &endpoints).await?)?;
            }
            BottleCommand::Get { id } => {
                print_json(&bottles::fetch_bottle(&client, &endpoints, id).await?)?;
            }
            BottleCommand::Add {
                name,
                brand,
                flavor_profile,
                material,
                capacity_ml,
            } => {
                let bottle = bottles::BottleCreate {
                    name,
                    brand,
                    flavor_profile,
                    material,
                    capacity_ml,
                };
                print_json(&bottles::add_bottle(&client, &endpoints, &bottle).await?)?;
            }
            BottleCommand::Delete { id } => {
                bottles::delete_bottle(&client, &endpoints, id).await?;
                println!("Deleted bottle {}.", id);
            }
        },

        Command::Recipes { command } => match command {
            RecipeCommand::List => {
                print_json(&recipes::fetch_all_recipes(&client, &endpoints).await?)?;
            }
            RecipeCommand::Get { id } => {
                print_json(&recipes::fetch_recipe(&client, &endpoints, id).await?)?;
            }
            RecipeCommand::Add {
                name,
                instructions,
                ingredients,
                bottle_ids,
            } => {
                let recipe = recipes::RecipeCreate {
                    name,
                    instructions,
                    ingredients,
                    bottle_ids: recipes::parse_id_list(&bottle_ids),
                };
                print_json(&recipes::add_recipe(&client, &endpoints, &recipe).await?)?;
            }
            RecipeCommand::Delete { id } => {
                recipes::delete_recipe(&client, &endpoints, id).await?;
                println!("Deleted recipe {}.", id);
            }
        },

        Command::Spirits { command } => match command {
            SpiritCommand::List => {
                print_json(&spirit_types::fetch_all_spirit_types(&client, &endpoints).await?)?;
            }
            SpiritCommand::Add { name } => {
                print_json(&spirit_types::add_spirit_type(&client, &endpoints, &name).await?)?;
            }
        },

        Command::Barcode { command } => match command {
            BarcodeCommand::Lookup { barcode } => {
                let result = barcode::lookup_barcode(&client, &endpoints, &barcode).await?;
                if !result.found {
                    tracing::info!("Barcode not in registry");
                }
                print_json(&result)?;
            }
            BarcodeCommand::Register {
                barcode: code,
                name,
                brand,
                flavor_profile,
                capacity_ml,
                spirit_type_name,
            } => {
                let request = barcode::BarcodeRegisterRequest {
                    barcode: code,
                    name,
                    brand,
                    flavor_profile,
                    capacity_ml,
                    spirit_type_name,
                };
                print_json(&barcode::register_barcode(&client, &endpoints, &request).await?)?;
            }
        },
    }

    Ok(())
}

fn prompt_username(username: Option<String>) -> Result<String> {
    match username {
        Some(u) => Ok(u),
        None => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            Ok(username)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
