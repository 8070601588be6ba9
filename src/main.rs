use clap::{Parser, Subcommand};
use log::{error, info};

use kostkita::{
    dashboard::RoomFilter,
    utils::{current_billing_period, format_rupiah_compact},
    AppError, AppState, Config, Repository, RoomStatus,
};

#[derive(Parser)]
#[command(name = "kostkita", version, about = "Manage tenants, rooms and rent payments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login { username: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Pull tenants, rooms and payments from the server
    Sync,
    /// List rooms
    Rooms {
        #[arg(long)]
        status: Option<RoomStatus>,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List tenants
    Tenants,
    /// List payments
    Payments,
    /// Occupancy and income for a billing period
    Summary {
        /// e.g. "Oktober 2026"; defaults to the current month
        #[arg(long)]
        period: Option<String>,
    },
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let state = AppState::connect(&config).await?;

    run(&state, cli.command).await?;
    state.db_pool.close().await;
    Ok(())
}

async fn run(state: &AppState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login { username, password } => {
            let user = state.session.login(&username, &password).await?;
            println!("Logged in as {} ({})", user.full_name, user.role);
        }
        Command::Logout => {
            state.session.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => match state.session.current_user().await? {
            Some(user) => println!("{} <{}> [{}]", user.full_name, user.email, user.role),
            None => println!("Not logged in"),
        },
        Command::Sync => {
            let mut first_failure = None;
            for result in state.sync_all().await {
                match result {
                    Ok(outcome) => println!("{}: {} records", outcome.entity, outcome.applied),
                    Err(e) => {
                        error!("{}", e);
                        first_failure.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = first_failure {
                return Err(e);
            }
        }
        Command::Rooms { status, search } => {
            let rooms = state.rooms.get_all().await?;
            let filter = RoomFilter {
                status,
                query: search,
            };
            for room in filter.apply(&rooms) {
                println!(
                    "Kamar {:<6} {:<12} lantai {:<2} {:>10} {}",
                    room.room_number,
                    room.room_type,
                    room.floor,
                    format_rupiah_compact(room.monthly_rate),
                    room.status
                );
            }
        }
        Command::Tenants => {
            for tenant in state.tenants.get_all().await? {
                println!(
                    "{:<24} {:<16} {:<14} kamar {}",
                    tenant.name,
                    tenant.phone,
                    tenant.occupation,
                    tenant.room_id.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Payments => {
            for payment in state.payments.get_all().await? {
                println!(
                    "{:<16} {:>10} {:<12} denda {}",
                    payment.period,
                    format_rupiah_compact(payment.amount_paid),
                    payment.status,
                    format_rupiah_compact(payment.penalty)
                );
            }
        }
        Command::Summary { period } => {
            let period = period.unwrap_or_else(current_billing_period);
            let summary = state.summary(&period).await?;
            info!("Summary computed for {}", summary.period);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
