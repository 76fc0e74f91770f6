mod api;
mod commands;
mod config;
mod state;
mod totals;

use std::process::ExitCode;
use std::sync::Arc;

use api::auth::{KeychainTokenStore, MemoryTokenStore, TokenStore};
use api::error::ClientError;
use api::types::{ClientInput, OrderLine};
use commands::OrderClient;
use config::ClientConfig;
use state::AppState;

mod cli {
    use clap::{Parser, Subcommand};

    use crate::api::types::OrderLine;

    #[derive(Parser, Debug)]
    #[command(name = "orderdesk", version, about = "Manage clients, products and orders")]
    pub struct Args {
        /// API base URL (overrides ORDERDESK_API_URL)
        #[arg(long, global = true)]
        pub api_url: Option<String>,

        /// Keep the login token in memory only instead of the system keychain
        #[arg(long, global = true)]
        pub ephemeral: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Log in and store the bearer token
        Login {
            #[arg(long)]
            email: String,
            #[arg(long, env = "ORDERDESK_PASSWORD", hide_env_values = true)]
            password: String,
        },
        /// Log out and forget the stored token
        Logout,
        /// List or create clients
        #[command(subcommand)]
        Clients(ClientsCommand),
        /// List or create products
        #[command(subcommand)]
        Products(ProductsCommand),
        /// List, show, create, edit or delete orders
        #[command(subcommand)]
        Orders(OrdersCommand),
    }

    #[derive(Subcommand, Debug)]
    pub enum ClientsCommand {
        List,
        Create {
            #[arg(long)]
            name: String,
            #[arg(long)]
            email: String,
        },
    }

    #[derive(Subcommand, Debug)]
    pub enum ProductsCommand {
        List,
        Create {
            #[arg(long)]
            name: String,
            /// Unit price, e.g. 10.50 or 10,50
            #[arg(long)]
            price: String,
        },
    }

    #[derive(clap::Args, Debug)]
    pub struct NewClientArgs {
        /// Name for a client created together with the order
        #[arg(long, requires = "client_email", conflicts_with = "client_id")]
        pub client_name: Option<String>,
        #[arg(long, requires = "client_name")]
        pub client_email: Option<String>,
    }

    #[derive(Subcommand, Debug)]
    pub enum OrdersCommand {
        List,
        Show {
            id: u64,
        },
        Create {
            /// Existing client id
            #[arg(long, required_unless_present = "client_name")]
            client_id: Option<u64>,
            #[command(flatten)]
            new_client: NewClientArgs,
            /// Order line as PRODUCT_ID:QUANTITY[:UNIT_PRICE] (repeatable; price defaults to the catalog price)
            #[arg(long = "item", required = true)]
            items: Vec<OrderLine>,
        },
        Edit {
            id: u64,
            #[arg(long)]
            client_id: Option<u64>,
            /// Replacement order lines as PRODUCT_ID:QUANTITY[:UNIT_PRICE]
            #[arg(long = "item")]
            items: Vec<OrderLine>,
        },
        Delete {
            id: u64,
        },
    }
}

async fn run(state: &AppState, command: cli::Command) -> Result<String, ClientError> {
    use cli::{ClientsCommand, Command, OrdersCommand, ProductsCommand};

    match command {
        Command::Login { email, password } => commands::login(state, &email, &password).await,
        Command::Logout => commands::logout(state).await,
        Command::Clients(ClientsCommand::List) => commands::list_clients(state).await,
        Command::Clients(ClientsCommand::Create { name, email }) => {
            commands::create_client(state, &name, &email).await
        }
        Command::Products(ProductsCommand::List) => commands::list_products(state).await,
        Command::Products(ProductsCommand::Create { name, price }) => {
            commands::create_product(state, &name, &price).await
        }
        Command::Orders(OrdersCommand::List) => commands::list_orders(state).await,
        Command::Orders(OrdersCommand::Show { id }) => commands::show_order(state, id).await,
        Command::Orders(OrdersCommand::Create {
            client_id,
            new_client,
            items,
        }) => {
            let client = match (client_id, new_client.client_name, new_client.client_email) {
                (Some(id), _, _) => OrderClient::Existing(id),
                (None, Some(name), Some(email)) => OrderClient::New(ClientInput { name, email }),
                _ => {
                    return Err(ClientError::InvalidInput(
                        "Select a client with --client-id or --client-name/--client-email.".into(),
                    ))
                }
            };
            commands::create_order(state, client, items).await
        }
        Command::Orders(OrdersCommand::Edit {
            id,
            client_id,
            items,
        }) => {
            let items: Option<Vec<OrderLine>> = (!items.is_empty()).then_some(items);
            commands::edit_order(state, id, client_id, items).await
        }
        Command::Orders(OrdersCommand::Delete { id }) => commands::delete_order(state, id).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    env_logger::init();

    let args = <cli::Args as clap::Parser>::parse();

    let config = match ClientConfig::resolve(args.api_url) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("Using API at {}", config.base_url);

    let token_store: Arc<dyn TokenStore> = if args.ephemeral {
        Arc::new(MemoryTokenStore::default())
    } else {
        Arc::new(KeychainTokenStore::default())
    };

    let state = match AppState::bootstrap(&config, token_store).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize API client: {}", e);
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match run(&state, args.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Command failed: {}", e);
            eprintln!("{}", e.user_message());
            if e.requires_login() {
                eprintln!("  orderdesk login --email <EMAIL>");
            }
            ExitCode::FAILURE
        }
    }
}
