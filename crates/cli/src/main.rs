//! Shopfront CLI - browse the catalog, manage a cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in SHOPFRONT_SESSION_FILE)
//! shopfront login -e shopper@example.com
//!
//! # Browse
//! shopfront products --page 2
//! shopfront products --search tee --brand Nile
//! shopfront product 6428ebc6dc1175abc65ca0b9
//!
//! # Cart
//! shopfront cart add 6428ebc6dc1175abc65ca0b9
//! shopfront cart set 6428ebc6dc1175abc65ca0b9 3
//! shopfront cart show
//!
//! # Check out with a saved address
//! shopfront address add --name Home --details "12 Nile St" --phone 01012345678 --city Cairo
//! shopfront checkout
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `register`, `whoami` - Session
//! - `password forgot|verify|reset` - Password reset flow
//! - `cart show|add|set|remove` - Cart
//! - `wishlist show|add|remove` - Wishlist
//! - `address list|add|remove` - Saved shipping addresses
//! - `orders`, `checkout` - Orders
//! - `products`, `product`, `categories`, `brands` - Catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use shopfront_client::models::ProductFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;
mod session_file;

use commands::{CliError, Context};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Mobile phone number
        #[arg(long)]
        phone: String,

        /// Account password
        #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Reset a forgotten password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Show or change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },
    /// Manage saved shipping addresses
    Address {
        #[command(subcommand)]
        action: Option<AddressAction>,
    },
    /// List past orders, newest first
    Orders,
    /// Place a cash-on-delivery order for the current cart
    Checkout {
        /// Saved address ID (default: the first saved address)
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List products
    Products {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Products per page
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Search title, description and brand (searches the whole catalog)
        #[arg(short, long)]
        search: Option<String>,

        /// Only products in this category (exact name)
        #[arg(long)]
        category: Option<String>,

        /// Only products of this brand (exact name)
        #[arg(long)]
        brand: Option<String>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
    /// List brands
    Brands,
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Email a reset code
    Forgot {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Check a reset code
    Verify {
        /// Code from the reset email
        code: String,
    },
    /// Set a new password and sign in
    Reset {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New password
        #[arg(short, long, env = "SHOPFRONT_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product: String,
    },
    /// Set the quantity of a product already in the cart
    Set {
        /// Product ID
        product: String,

        /// New quantity (values below 1 become 1)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product: String,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a product
    Add {
        /// Product ID
        product: String,
    },
    /// Remove a product
    Remove {
        /// Product ID
        product: String,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        /// Label (e.g. "Home")
        #[arg(short, long)]
        name: String,

        /// Street address
        #[arg(short, long)]
        details: String,

        /// Contact phone number
        #[arg(short, long)]
        phone: String,

        /// City
        #[arg(short, long)]
        city: String,
    },
    /// Remove a saved address
    Remove {
        /// Address ID
        id: String,
    },
}

/// Initialize Sentry error tracking.
///
/// Returns `None` if `SENTRY_DSN` is not configured.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Quiet by default: notifications are the primary output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cli=info,shopfront_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), CliError> {
    let ctx = Context::open(config).await?;
    let mut notifications = ctx.storefront().notifier().subscribe();

    let result = dispatch(&ctx, cli.command).await;

    output::print_notifications(&mut notifications);

    if let Err(e) = &result
        && e.is_unauthorized()
    {
        tracing::warn!("Stored session was rejected, signing out");
        ctx.forget_session().await?;
    }

    result
}

async fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login { email, password } => {
            commands::auth::login(ctx, &email, SecretString::from(password)).await
        }
        Commands::Logout => commands::auth::logout(ctx).await,
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => {
            commands::auth::register(ctx, name, &email, phone, SecretString::from(password)).await
        }
        Commands::Whoami => {
            commands::auth::whoami(ctx);
            Ok(())
        }
        Commands::Password { action } => match action {
            PasswordAction::Forgot { email } => commands::auth::forgot_password(ctx, &email).await,
            PasswordAction::Verify { code } => commands::auth::verify_reset_code(ctx, &code).await,
            PasswordAction::Reset { email, password } => {
                commands::auth::reset_password(ctx, &email, SecretString::from(password)).await
            }
        },
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(ctx).await,
            CartAction::Add { product } => commands::cart::add(ctx, product).await,
            CartAction::Set { product, quantity } => {
                commands::cart::set_quantity(ctx, product, quantity).await
            }
            CartAction::Remove { product } => commands::cart::remove(ctx, product).await,
        },
        Commands::Wishlist { action } => match action.unwrap_or(WishlistAction::Show) {
            WishlistAction::Show => commands::wishlist::show(ctx).await,
            WishlistAction::Add { product } => commands::wishlist::add(ctx, product).await,
            WishlistAction::Remove { product } => commands::wishlist::remove(ctx, product).await,
        },
        Commands::Address { action } => match action.unwrap_or(AddressAction::List) {
            AddressAction::List => commands::address::list(ctx).await,
            AddressAction::Add {
                name,
                details,
                phone,
                city,
            } => commands::address::add(ctx, name, details, phone, city).await,
            AddressAction::Remove { id } => commands::address::remove(ctx, id).await,
        },
        Commands::Orders => commands::orders::list(ctx).await,
        Commands::Checkout { address } => commands::orders::checkout(ctx, address).await,
        Commands::Products {
            page,
            limit,
            search,
            category,
            brand,
        } => {
            let filter = ProductFilter {
                query: search.unwrap_or_default(),
                category,
                brand,
            };
            commands::catalog::products(ctx, page, limit, &filter).await
        }
        Commands::Product { id } => commands::catalog::product(ctx, id).await,
        Commands::Categories => commands::catalog::categories(ctx).await,
        Commands::Brands => commands::catalog::brands(ctx).await,
    }
}
