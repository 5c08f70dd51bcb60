//! `supervibe` - terminal client for the SuperVibe store API.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then sign in (the user object is kept in the OS keyring)
//! supervibe signup customer -n Rana -e rana@supervibe.jo --age 29 --membership
//! supervibe signup employee -n Omar -e omar@supervibe.jo --age 34 --role CASHIER
//! supervibe login -e cashier@supervibe.jo --role CASHIER
//!
//! # Back office
//! supervibe dashboard
//! supervibe list products
//! supervibe create branch name=Abdoun location=amman size=300
//! supervibe delete customer 12
//!
//! # Shop at a branch and check out
//! supervibe shop
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, BufRead, Write};

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use zeroize::Zeroizing;

use supervibe_pos_lib::auth::{AccountKind, NewAccount};
use supervibe_pos_lib::commands::{self, auth::read_password, shop::ShopCommand, shop::ShopConsole};
use supervibe_pos_lib::{
    logging, schema, Config, EntityKind, HttpTransport, Notice, PosError, Session,
};

#[derive(Parser)]
#[command(name = "supervibe")]
#[command(author, version, about = "SuperVibe POS terminal client")]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_SHA"), ")"))]
struct Cli {
    /// API server, e.g. `http://localhost:8000`
    #[arg(long, global = true, env = "SUPERVIBE_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AccountArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    email: String,

    #[arg(long)]
    age: u32,

    /// Read from the terminal when omitted
    #[arg(short, long, env = "SUPERVIBE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum SignupAccount {
    /// Shopper account
    Customer {
        #[command(flatten)]
        account: AccountArgs,

        #[arg(long)]
        membership: bool,
    },
    /// Staff account
    Employee {
        #[command(flatten)]
        account: AccountArgs,

        #[arg(short, long, default_value = "CASHIER")]
        role: String,

        /// `YYYY-MM-DD`, today when omitted
        #[arg(long)]
        date_of_employment: Option<String>,
    },
}

#[derive(Subcommand)]
enum Commands {
    /// Create a customer or employee account
    Signup {
        #[command(subcommand)]
        account: SignupAccount,
    },
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from the terminal when omitted
        #[arg(short, long, env = "SUPERVIBE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// `customer`, or a staff role such as `CASHIER`
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Store overview with recent sales
    Dashboard,
    /// List the records of a section
    List { section: EntityKind },
    /// Show the form fields of a section
    Fields { section: EntityKind },
    /// Create a record from `name=value` pairs, or interactively
    Create {
        section: EntityKind,
        values: Vec<String>,
    },
    /// Delete a record
    Delete {
        section: EntityKind,
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive shop: pick a branch, fill a cart, check out
    Shop,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let guard = logging::init_logging();
    info!("{}", logging::about());

    let result = run(cli).await;

    if let Err(e) = result {
        match e.downcast_ref::<PosError>() {
            Some(PosError::SessionRequired) => {
                eprintln!("{e}. Run `supervibe login` first.");
            }
            _ => eprintln!("error: {e:#}"),
        }
        error!("Command failed: {e:#}");
        drop(guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env(cli.api_url.as_deref());

    match cli.command {
        Commands::Signup { account } => {
            let account = new_account(account)?;
            let api = HttpTransport::new(&config, None)?;
            println!("{}", commands::auth::signup(&api, &account).await);
        }
        Commands::Login {
            email,
            password,
            role,
        } => {
            let password = password_or_prompt(password)?;
            let api = HttpTransport::new(&config, None)?;
            for notice in commands::auth::login(&api, &email, &password, &role).await? {
                println!("{notice}");
            }
        }
        Commands::Logout => println!("{}", commands::auth::logout()?),
        Commands::Whoami => println!("{}", commands::auth::whoami()?),
        Commands::Dashboard => {
            let api = connect(&config)?;
            println!("{}", commands::admin::dashboard(&api).await);
        }
        Commands::List { section } => {
            let api = connect(&config)?;
            println!("{}", commands::admin::list(&api, section).await);
        }
        Commands::Fields { section } => println!("{}", commands::admin::describe_fields(section)),
        Commands::Create { section, values } => {
            let api = connect(&config)?;
            let fields = if values.is_empty() {
                println!("New {} (leave blank to skip)", section.singular());
                let stdin = io::stdin();
                commands::admin::prompt_fields(section, &mut stdin.lock(), &mut io::stdout())
                    .context("reading form input")?
            } else {
                values
                    .iter()
                    .map(|v| schema::parse_assignment(v))
                    .collect::<Result<Vec<_>, _>>()?
            };
            println!("{}", commands::admin::create(&api, section, &fields).await);
        }
        Commands::Delete { section, id, yes } => {
            let api = connect(&config)?;
            let confirm = || {
                yes || read_line(&format!(
                    "Are you sure you want to delete {} #{id}? [y/N] ",
                    section.singular()
                ))
                .is_ok_and(|answer| answer.eq_ignore_ascii_case("y"))
            };
            println!(
                "{}",
                commands::admin::delete(&api, section, id, confirm).await
            );
        }
        Commands::Shop => run_shop(&config).await?,
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> io::Result<Zeroizing<String>> {
    match password {
        Some(p) => Ok(Zeroizing::new(p)),
        None => read_password("Password: "),
    }
}

fn new_account(args: SignupAccount) -> anyhow::Result<NewAccount> {
    let (account, kind) = match args {
        SignupAccount::Customer {
            account,
            membership,
        } => (account, AccountKind::Customer { membership }),
        SignupAccount::Employee {
            account,
            role,
            date_of_employment,
        } => {
            let date_of_employment = date_of_employment
                .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            (
                account,
                AccountKind::Employee {
                    role,
                    date_of_employment,
                },
            )
        }
    };
    Ok(NewAccount {
        password: password_or_prompt(account.password)?,
        name: account.name,
        email: account.email,
        age: account.age,
        kind,
    })
}

/// Load the session, warn once when it carries no token, and build the
/// transport.
fn connect_session(config: &Config) -> anyhow::Result<(Session, HttpTransport)> {
    let (session, api) = commands::connect(config)?;
    if let Some(notice) = session.token_notice() {
        eprintln!("{notice}");
    }
    Ok((session, api))
}

fn connect(config: &Config) -> anyhow::Result<HttpTransport> {
    Ok(connect_session(config)?.1)
}

fn read_line(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_shop(config: &Config) -> anyhow::Result<()> {
    let (session, api) = connect_session(config)?;
    let mut console = ShopConsole::new();

    println!("Hello, {}! Type `help` for commands.", session.display_name());
    let branches = console
        .execute(&api, &session, ShopCommand::Branches, Local::now().naive_local())
        .await;
    println!("{branches}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", console.prompt());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ShopCommand>() {
            Ok(ShopCommand::Quit) => break,
            Ok(cmd) => {
                let out = console
                    .execute(&api, &session, cmd, Local::now().naive_local())
                    .await;
                println!("{out}");
            }
            Err(e) => println!("{}", Notice::from_error(&e, "Invalid command")),
        }
    }

    if !console.shop().cart().is_empty() {
        println!(
            "{}",
            Notice::info("Leaving the shop, the cart was not checked out")
        );
    }
    Ok(())
}
