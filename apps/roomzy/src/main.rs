use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    catalog::{PropertyPortfolio, NO_PROPERTIES_MESSAGE},
    config::normalize_server_url,
    load_settings,
    navigation::NavView,
    Attachment, Authenticator, LoginForm, LoginOutcome, NavigationController, Navigator,
    Presentation, PropertyForm, RoomzyHttpClient, Session, SessionController,
    SimulatedAuthenticator, SubmitOutcome,
};
use shared::domain::{Amenity, PropertyId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roomzy", about = "Roomzy property client")]
struct Args {
    /// Overrides the server url from roomzy.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current user and print the navigation they would see.
    Menu {
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long)]
        mobile: bool,
    },
    /// Register a property.
    Register(RegisterArgs),
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Skip the server and accept any credentials after the configured delay.
        #[arg(long)]
        simulated: bool,
    },
    /// Search or prune an admin property portfolio stored as JSON.
    Portfolio {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        delete: Vec<i64>,
    },
}

#[derive(clap::Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    #[arg(long, default_value = "")]
    bedrooms: String,
    #[arg(long, default_value = "")]
    bathrooms: String,
    #[arg(long = "type")]
    property_type: Option<String>,
    /// Repeat for each checked amenity, e.g. `--amenity WiFi --amenity Gym`.
    #[arg(long = "amenity")]
    amenities: Vec<String>,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long = "image")]
    images: Vec<PathBuf>,
    /// Drop the attached image at this index before submitting.
    #[arg(long)]
    remove_image: Option<usize>,
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, destination: &str) {
        println!("-> {destination}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(raw) = args.server_url.as_deref() {
        settings.server_url = normalize_server_url(raw)
            .with_context(|| format!("invalid --server-url {raw}"))?;
    }
    info!(server_url = %settings.server_url, "using server");
    let client = Arc::new(RoomzyHttpClient::from_settings(&settings)?);

    match args.command {
        Command::Menu { path, mobile } => {
            let session = Session::new();
            let controller = Arc::new(SessionController::new(
                session.clone(),
                client,
                settings.request_timeout,
            ));
            let navigation = NavigationController::new(session);
            let presentation = if mobile {
                Presentation::Mobile
            } else {
                Presentation::Desktop
            };

            println!("before sign-in:");
            print_nav(&navigation.render(presentation, &path).await);

            controller.spawn_initialize().await?;
            println!("after sign-in:");
            print_nav(&navigation.render(presentation, &path).await);
        }
        Command::Register(register) => run_register(register, &client, &settings).await?,
        Command::Login {
            username,
            password,
            simulated,
        } => {
            let mut form = LoginForm::new(
                settings.post_login_destination.clone(),
                settings.request_timeout,
            );
            form.set_username(username);
            form.set_password(password);
            let simulator = SimulatedAuthenticator::new(settings.auth_delay);
            let authenticator: &dyn Authenticator = if simulated {
                &simulator
            } else {
                client.as_ref()
            };

            match form.submit(authenticator, &PrintNavigator).await {
                LoginOutcome::SignedIn { .. } => println!("signed in"),
                LoginOutcome::Invalid => {
                    for (field, message) in form.errors().iter() {
                        println!("{field}: {message}");
                    }
                    bail!("login form is invalid");
                }
                LoginOutcome::Failed => {
                    bail!("{}", form.server_error().unwrap_or("login failed"))
                }
            }
        }
        Command::Portfolio {
            file,
            search,
            delete,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut portfolio = PropertyPortfolio::from_json(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            for id in delete {
                if portfolio.remove(PropertyId(id)).is_none() {
                    println!("no property with id {id}");
                }
            }
            let found = portfolio.search(&search);
            if found.is_empty() {
                println!("{NO_PROPERTIES_MESSAGE}");
            }
            for property in found {
                println!(
                    "#{} {} | {} | {} | {} occupied | {}",
                    property.id.0,
                    property.name,
                    property.address,
                    property.area_label(),
                    property.occupancy,
                    property.revenue_label()
                );
            }
        }
    }

    Ok(())
}

async fn run_register(
    args: RegisterArgs,
    client: &RoomzyHttpClient,
    settings: &client_core::ClientSettings,
) -> Result<()> {
    let mut form = PropertyForm::new(settings.request_timeout);
    form.set_property_name(args.name);
    form.set_address(args.address);
    form.set_bedrooms_input(&args.bedrooms);
    form.set_bathrooms_input(&args.bathrooms);
    if let Some(kind) = args.property_type {
        form.set_property_type(kind);
    }
    for label in &args.amenities {
        let amenity = Amenity::from_label(label)
            .with_context(|| format!("unknown amenity {label}"))?;
        form.set_amenity(amenity, true);
    }
    form.set_description(args.description);
    form.set_price_input(&args.price);
    form.set_contact_email(args.email);
    form.set_contact_phone(args.phone);

    let mut attachments = Vec::with_capacity(args.images.len());
    for path in &args.images {
        attachments.push(Attachment::from_path(path).await?);
    }
    form.attach_images(attachments);
    if let Some(index) = args.remove_image {
        if form.remove_image(index).is_none() {
            bail!("no attached image at index {index}");
        }
    }
    for (index, preview) in form.previews().iter().enumerate() {
        println!("preview {index}: {} ({})", preview.filename, preview.url);
    }

    match form.submit(client).await {
        SubmitOutcome::Registered {
            property_id,
            notice,
        } => {
            println!("{}: {} (id {})", notice.title, notice.description, property_id.0);
            Ok(())
        }
        SubmitOutcome::Rejected(errors) => {
            for (field, message) in errors.iter() {
                println!("{field}: {message}");
            }
            bail!("property form is invalid")
        }
        SubmitOutcome::Failed { message } => bail!(message),
    }
}

fn print_nav(view: &NavView) {
    for link in &view.links {
        let marker = if link.active { "*" } else { " " };
        println!(
            "{marker} {:<18} {} [{:?}]",
            link.entry.label, link.entry.destination, link.entry.icon
        );
    }
    if let Some(account) = &view.account {
        println!("  {}: {}", account.heading, account.labels().join(", "));
    }
}
