//! `vayuwatch` - CLI for the vayuwatch air quality toolkit
//!
//! This binary classifies AQI readings, browses the reference dataset and
//! drives the demo account store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use rand::{rngs::SmallRng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use vayuwatch::cli::{
    output, AuthCommand, CitiesCommand, Cli, Command, ConfigCommand, GrapCommand, LookupCommand,
    TrendCommand,
};
use vayuwatch::{
    aqi, init_logging, stats, Config, CredentialStore, Dataset, Error, SqliteStore, SystemClock,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands must work while the config file is broken.
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(cli.config, config_cmd),
        command => command,
    };

    let config = Config::load_from(cli.config)?;

    match command {
        Command::Auth(auth_cmd) => handle_auth(&config, auth_cmd).await,
        command => {
            let dataset = Dataset::load_or_builtin(config.dataset.path.as_deref())?;
            handle_data(&dataset, command)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_data(dataset: &Dataset, command: Command) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Classify(cmd) => {
            if cmd.json {
                let category = aqi::classify(cmd.aqi);
                print_json(&serde_json::json!({
                    "aqi": cmd.aqi,
                    "category": category,
                    "label": category.label(),
                    "color": category.color(),
                    "gauge": aqi::gauge_fraction(cmd.aqi),
                    "grapStage": aqi::grap_stage(category),
                    "advisory": category.advisory(),
                }))?;
            } else {
                output::classification(&mut out, cmd.aqi)?;
            }
        }
        Command::Stats(args) => {
            let summary = stats::national_stats(dataset).ok_or(Error::EmptyDataset)?;
            if args.json {
                print_json(&summary)?;
            } else {
                output::national_stats(&mut out, &summary)?;
            }
        }
        Command::Cities(cmd) => handle_cities(dataset, &cmd, &mut out)?,
        Command::City(cmd) => handle_city(dataset, &cmd, &mut out)?,
        Command::State(cmd) => {
            let state = dataset
                .state(&cmd.id)
                .ok_or_else(|| Error::unknown_entity("state", &cmd.id))?;
            if cmd.json {
                print_json(state)?;
            } else {
                output::state(&mut out, state)?;
            }
        }
        Command::Ward(cmd) => handle_ward(dataset, &cmd, &mut out)?,
        Command::Alerts(args) => {
            let alerts = stats::alerts(dataset);
            if args.json {
                print_json(&alerts)?;
            } else {
                output::alerts(&mut out, &alerts)?;
            }
        }
        Command::Trend(cmd) => handle_trend(dataset, &cmd, &mut out)?,
        Command::Grap(cmd) => handle_grap(&cmd, &mut out)?,
        Command::Sources(args) => {
            let sources = vayuwatch::dataset::pollution_sources();
            if args.json {
                print_json(sources)?;
            } else {
                output::sources(&mut out, sources)?;
            }
        }
        Command::Auth(_) | Command::Config(_) => bail!("not a dataset command"),
    }

    out.flush()?;
    Ok(())
}

fn handle_cities(
    dataset: &Dataset,
    cmd: &CitiesCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let cities = dataset.select_cities(cmd.state.as_deref(), cmd.top)?;

    if cmd.json {
        print_json(&cities)?;
    } else {
        output::city_table(out, &cities)?;
    }
    Ok(())
}

fn handle_city(dataset: &Dataset, cmd: &LookupCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let city = dataset
        .city(&cmd.id)
        .ok_or_else(|| Error::unknown_entity("city", &cmd.id))?;
    if cmd.json {
        print_json(city)?;
    } else {
        output::city(out, city)?;
    }
    Ok(())
}

fn handle_ward(dataset: &Dataset, cmd: &LookupCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let ctx = dataset
        .ward(&cmd.id)
        .ok_or_else(|| Error::unknown_entity("ward", &cmd.id))?;
    if cmd.json {
        print_json(&serde_json::json!({
            "ward": ctx.ward,
            "cityId": ctx.city.id,
            "cityName": ctx.city.name,
            "stateId": ctx.state.id,
            "stateName": ctx.state.name,
        }))?;
    } else {
        output::ward(out, &ctx)?;
    }
    Ok(())
}

fn handle_trend(dataset: &Dataset, cmd: &TrendCommand, out: &mut impl Write) -> anyhow::Result<()> {
    if dataset.city(&cmd.city).is_none() {
        debug!("Unknown city {}, using default trend baseline", cmd.city);
    }

    let mut rng = match cmd.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let points = if cmd.weekly {
        dataset.weekly_trend(&cmd.city, &mut rng)
    } else {
        dataset.hourly_trend(&cmd.city, &mut rng)
    };

    if cmd.json {
        print_json(&points)?;
    } else {
        output::trend(out, &points)?;
    }
    Ok(())
}

fn handle_grap(cmd: &GrapCommand, out: &mut impl Write) -> anyhow::Result<()> {
    let category = cmd.aqi.map(aqi::classify);
    if cmd.json {
        let active = category.map_or(0, aqi::grap_stage);
        print_json(&serde_json::json!({
            "activeStage": active,
            "stages": aqi::GRAP_STAGES,
        }))?;
    } else {
        output::grap(out, category)?;
    }
    Ok(())
}

async fn handle_auth(config: &Config, cmd: AuthCommand) -> anyhow::Result<()> {
    let path = config.database_path();
    let storage = SqliteStore::open(&path)
        .with_context(|| format!("opening account store at {}", path.display()))?;
    let mut accounts = CredentialStore::new(storage, Arc::new(SystemClock), config.auth.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cmd {
        AuthCommand::Signup {
            phone,
            password,
            name,
        } => {
            if !accounts.signup(&phone, &password, name.as_deref()).await {
                bail!("{phone} is already registered");
            }
            writeln!(out, "Registered and signed in as {phone}.")?;
        }
        AuthCommand::Login { phone, password } => {
            if !accounts.login(&phone, &password).await {
                bail!("invalid phone number or password");
            }
            writeln!(out, "Signed in as {phone}.")?;
        }
        AuthCommand::OtpSend { phone, json } => {
            let grant = accounts.send_otp(&phone);
            if json {
                print_json(&grant)?;
            } else {
                output::otp_grant(&mut out, &phone, &grant)?;
            }
        }
        AuthCommand::OtpLogin { phone, code } => {
            let code = match code {
                Some(code) => code,
                None => {
                    let grant = accounts.send_otp(&phone);
                    output::otp_grant(&mut out, &phone, &grant)?;
                    grant.code
                }
            };
            if !accounts.login_with_otp(&phone, &code).await {
                bail!("invalid or expired code");
            }
            writeln!(out, "Signed in as {phone}.")?;
        }
        AuthCommand::ResetPassword { phone, password } => {
            if !accounts.reset_password(&phone, &password) {
                bail!("{phone} is not registered");
            }
            writeln!(out, "Password updated for {phone}.")?;
        }
        AuthCommand::Logout => {
            accounts.logout();
            writeln!(out, "Signed out.")?;
        }
        AuthCommand::Whoami { json } => {
            if json {
                print_json(&accounts.current_user())?;
            } else {
                output::user(&mut out, accounts.current_user())?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            let config = &config;
            if json {
                print_json(config)?;
            } else {
                let dataset = config
                    .dataset
                    .path
                    .as_ref()
                    .map_or_else(|| "(builtin)".to_string(), |p| p.display().to_string());

                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Auth]");
                println!("  Signup delay (ms):  {}", config.auth.signup_delay_ms);
                println!("  Login delay (ms):   {}", config.auth.login_delay_ms);
                println!("  OTP delay (ms):     {}", config.auth.otp_login_delay_ms);
                println!("  OTP TTL (s):        {}", config.auth.otp_ttl_secs);
                println!("  Demo mode:          {}", config.auth.demo_mode);
                println!();
                println!("[Dataset]");
                println!("  Path:               {dataset}");
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
