use std::{error::Error, path::PathBuf, process, sync::Arc};

use clap::{Parser, Subcommand};

use plfc_register::{
    config::Config,
    controller::{Activation, RegistrationController, SubmitError, SubmitOutcome},
    dir::DataDirectory,
    logger::{parse_log_level, setup_logger},
    plfc::{thanks_url, Location, Page, RawTeamForm},
    services::{backend::HttpBackend, payment::provider_from_config},
    terminal::{Prompter, TerminalCheckout},
    VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "plfc-register")]
#[command(about = "P.League FC team registration", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    conf: Option<PathBuf>,

    /// Path to the data directory, overriding the configuration
    #[arg(long)]
    datadir: Option<PathBuf>,

    /// Print the hosted checkout address instead of opening a browser
    #[arg(long)]
    no_browser: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activate the page at LOCATION, e.g. a provider return address
    Open { location: String },
    /// Submit the registration form and pay the registration fee
    Register {
        #[arg(long)]
        team_name: String,
        #[arg(long)]
        captain_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        players: String,
    },
    /// Show the thank-you page
    Thanks {
        #[arg(long)]
        team: Option<String>,
    },
    /// List the registered teams
    Teams,
}

fn print_outcome(result: Result<SubmitOutcome, SubmitError>) -> Result<(), Box<dyn Error>> {
    match result {
        Ok(SubmitOutcome::Registered {
            registration,
            redirect,
        }) => {
            println!(
                "Team '{}' registered. Registration code: {}",
                registration.team_name, registration.code
            );
            println!("{}", redirect);
            Ok(())
        }
        Ok(SubmitOutcome::Dismissed) => {
            println!("Payment cancelled. Nothing was registered.");
            Ok(())
        }
        Ok(SubmitOutcome::Redirected) => {
            println!("Waiting for the payment provider to send you back.");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Registration failed: {}", e);
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    }
}

async fn run_page(
    controller: &RegistrationController,
    prompter: &Prompter,
    location: &Location,
    form: Option<RawTeamForm>,
) -> Result<(), Box<dyn Error>> {
    match controller.activate(location).await {
        Activation::Idle => {
            eprintln!("Nothing to do for '{}'", location);
            process::exit(1);
        }
        Activation::AlreadyRegistered { team_name } => {
            println!("Team '{}' is already registered from this device.", team_name);
            if let Some(registration) = controller.registration() {
                println!("{}", registration.thanks_url());
            }
            Ok(())
        }
        Activation::Form(handle) => {
            let form = match form {
                Some(form) => form,
                None => prompter.prompt_form().await?,
            };
            print_outcome(handle.submit(&form).await)
        }
        Activation::Resumed(result) => print_outcome(result),
        Activation::Thanks { team_name } => {
            println!("Thank you, {}! Your registration is confirmed.", team_name);
            Ok(())
        }
        Activation::Roster { view } => {
            println!("{}", view.to_html());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = Config::from_file(args.conf.clone()).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        process::exit(1);
    });

    let datadir = match args.datadir.clone().or_else(|| config.data_dir()) {
        Some(path) => DataDirectory::new(path),
        None => {
            eprintln!("Could not locate a data directory.");
            process::exit(1);
        }
    };
    if !datadir.exists() {
        datadir.init()?;
    }

    let log_level = parse_log_level()?.unwrap_or(config.log_level);
    setup_logger(log_level, &datadir)?;
    let backend = Arc::new(HttpBackend::new(config.api_base.clone()));
    tracing::info!("plfc-register {} using backend {}", VERSION, backend.base_url());
    let prompter = Arc::new(Prompter::stdin());
    let provider = provider_from_config(
        &config.payment,
        Arc::new(TerminalCheckout::new(!args.no_browser, prompter.clone())),
    );
    let controller = RegistrationController::new(backend, provider, Arc::new(datadir.store()));

    match args.command {
        Command::Open { location } => {
            run_page(&controller, &prompter, &Location::parse(&location), None).await
        }
        Command::Register {
            team_name,
            captain_name,
            phone,
            email,
            players,
        } => {
            let form = RawTeamForm {
                team_name,
                captain_name,
                phone,
                email,
                players_count: players,
            };
            run_page(
                &controller,
                &prompter,
                &Location::parse(Page::Register.file_name()),
                Some(form),
            )
            .await
        }
        Command::Thanks { team } => {
            let location = match team {
                Some(team) => Location::parse(&thanks_url(&team, "")),
                None => Location::parse(Page::Thanks.file_name()),
            };
            run_page(&controller, &prompter, &location, None).await
        }
        Command::Teams => {
            let location = Location::parse(Page::Teams.file_name());
            run_page(&controller, &prompter, &location, None).await
        }
    }
}
