//! Headless command-line driver for the app store.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::features::app::{AppAction, AppEnvironment, AppReducer, AppState};
use crate::features::component_detail::ComponentDetailAction;
use crate::features::garage::{GarageAction, GarageState};
use crate::features::onboarding::OnboardingAction;
use crate::features::settings::SettingsAction;
use crate::logging::init_tracing;
use crate::model::{Bike, ComponentType, DistanceUnit};
use crate::mvi::Store;

/// gearshed - bike component and maintenance tracker
#[derive(Parser, Debug)]
#[command(name = "gearshed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the JSON data files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List bikes and their components
    #[command(alias = "ls")]
    Bikes,

    /// Add a bike
    AddBike {
        /// Bike name
        name: String,
    },

    /// Record a ride
    Ride {
        /// Bike name or id
        bike: String,
        /// Distance in the configured unit
        distance: f64,
    },

    /// Install a component on a bike
    AddComponent {
        /// Bike name or id
        bike: String,
        /// Component type (brakes, chain, cassette, ...)
        kind: ComponentType,
        /// Component name
        name: String,
    },

    /// Log a service for a component
    Service {
        /// Bike name or id
        bike: String,
        /// Component name or id
        component: String,
        /// Note stored with the record
        #[arg(long)]
        note: Option<String>,
    },

    /// Show or change settings
    Settings {
        /// Distance unit (km or mi)
        #[arg(long)]
        unit: Option<DistanceUnit>,
        /// Service interval in kilometers
        #[arg(long)]
        service_interval: Option<u32>,
    },

    /// Show onboarding status, or mark it completed
    Onboarding {
        #[arg(long)]
        complete: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data.dir = Some(dir);
    }

    init_tracing(&config.logging.filter);
    tracing::debug!(data_dir = %config.data_dir().display(), "Starting");

    let store = Store::new(
        AppState::default(),
        AppReducer::new(),
        AppEnvironment::live(&config),
    );

    let interrupt = store.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down store");
            interrupt.shutdown();
        }
    });

    store.send(AppAction::Appear)?;
    store.settled().await;
    check_errors(&store.state())?;

    let actions = actions_for(&cli.command, &store.state())?;
    for action in actions {
        store.send(action)?;
        store.settled().await;
    }
    if store.is_closed() {
        bail!("Interrupted");
    }

    let state = store.state();
    check_errors(&state)?;
    print(&cli.command, &state);
    store.shutdown();
    Ok(())
}

/// Translate a command into the actions a user would trigger.
fn actions_for(command: &Command, state: &AppState) -> Result<Vec<AppAction>> {
    let unit = state.settings.settings.distance_unit;
    let actions = match command {
        Command::Bikes => Vec::new(),
        Command::AddBike { name } => vec![AppAction::Garage(GarageAction::AddBike {
            name: name.clone(),
        })],
        Command::Ride { bike, distance } => {
            let bike = find_bike(&state.garage, bike)?;
            vec![AppAction::Garage(GarageAction::RecordRide {
                bike: bike.id,
                distance_km: unit.to_km(*distance),
            })]
        }
        Command::AddComponent { bike, kind, name } => {
            let bike = find_bike(&state.garage, bike)?;
            vec![AppAction::Garage(GarageAction::AddComponent {
                bike: bike.id,
                kind: *kind,
                name: name.clone(),
            })]
        }
        Command::Service {
            bike,
            component,
            note,
        } => {
            let bike = find_bike(&state.garage, bike)?;
            let component = bike
                .components
                .iter()
                .find(|c| matches_key(component, c.id, &c.name))
                .with_context(|| format!("No component '{component}' on {}", bike.name))?;
            let mut actions = vec![AppAction::OpenComponent {
                bike: bike.id,
                component: component.id,
            }];
            if let Some(note) = note {
                actions.push(AppAction::ComponentDetail(ComponentDetailAction::SetNote(
                    note.clone(),
                )));
            }
            actions.push(AppAction::ComponentDetail(ComponentDetailAction::LogService));
            actions.push(AppAction::CloseComponent);
            actions
        }
        Command::Settings {
            unit,
            service_interval,
        } => {
            let mut actions = Vec::new();
            if let Some(unit) = unit {
                actions.push(AppAction::Settings(SettingsAction::SetDistanceUnit(*unit)));
            }
            if let Some(km) = service_interval {
                actions.push(AppAction::Settings(SettingsAction::SetServiceInterval(*km)));
            }
            if !actions.is_empty() {
                actions.push(AppAction::Settings(SettingsAction::Save));
            }
            actions
        }
        Command::Onboarding { complete: true } => {
            vec![AppAction::Onboarding(OnboardingAction::Complete)]
        }
        Command::Onboarding { complete: false } => Vec::new(),
    };
    Ok(actions)
}

fn find_bike<'a>(garage: &'a GarageState, key: &str) -> Result<&'a Bike> {
    garage
        .bikes
        .iter()
        .find(|b| b.id.to_string() == key)
        .or_else(|| garage.find_by_name(key))
        .with_context(|| format!("No bike named '{key}'"))
}

fn matches_key(key: &str, id: Uuid, name: &str) -> bool {
    id.to_string() == key || name.eq_ignore_ascii_case(key.trim())
}

fn check_errors(state: &AppState) -> Result<()> {
    if let Some(error) = &state.settings.error {
        bail!("Settings: {error}");
    }
    if let Some(error) = &state.garage.error {
        bail!("Garage: {error}");
    }
    Ok(())
}

fn print(command: &Command, state: &AppState) {
    let settings = &state.settings.settings;
    match command {
        Command::Settings { .. } => {
            println!("distance unit:    {}", settings.distance_unit.suffix());
            println!("service interval: {} km", settings.service_interval_km);
        }
        Command::Onboarding { .. } => {
            if state.onboarding.completed {
                println!("onboarding completed");
            } else {
                println!("onboarding not completed ({})", state.onboarding.page.title());
            }
        }
        _ => print_garage(state),
    }
}

fn print_garage(state: &AppState) {
    let unit = state.settings.settings.distance_unit;
    let interval = state.settings.settings.service_interval_km;
    if state.garage.bikes.is_empty() {
        println!("No bikes yet. Add one with `gearshed add-bike <NAME>`.");
        return;
    }
    for bike in &state.garage.bikes {
        println!("{}  {}  ({})", bike.id, bike.name, unit.format(bike.odometer_km));
        for component in &bike.components {
            let mut flags = Vec::new();
            if component.retired {
                flags.push("retired".to_string());
            } else if component.service_due(interval) {
                flags.push("service due".to_string());
            }
            if let Some(last) = component.last_service() {
                flags.push(format!(
                    "{} service(s), last at {}",
                    component.history.len(),
                    unit.format(last.distance_km)
                ));
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!("  [{}]", flags.join(", "))
            };
            println!(
                "    {:<10} {:<20} {}{}",
                component.kind,
                component.name,
                unit.format(component.distance_km),
                flags
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;

    fn state_with_bike() -> AppState {
        let mut bike = Bike::new(Uuid::from_u128(1), "Commuter", 0);
        bike.components
            .push(Component::new(Uuid::from_u128(2), ComponentType::Chain, "KMC", 0));
        let mut state = AppState::default();
        state.garage.bikes.push(bike);
        state
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["gearshed", "--data-dir", "/tmp/g", "ride", "commuter", "12.5"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/g")));
        assert!(matches!(cli.command, Command::Ride { ref bike, distance } if bike == "commuter" && distance == 12.5));

        let cli = Cli::try_parse_from(["gearshed", "settings", "--unit", "mi"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Settings { unit: Some(DistanceUnit::Miles), service_interval: None }
        ));
    }

    #[test]
    fn ride_converts_miles_to_kilometers() {
        let mut state = state_with_bike();
        state.settings.settings.distance_unit = DistanceUnit::Miles;
        let command = Command::Ride {
            bike: "commuter".into(),
            distance: 10.0,
        };

        let actions = actions_for(&command, &state).unwrap();
        assert_eq!(
            actions,
            vec![AppAction::Garage(GarageAction::RecordRide {
                bike: Uuid::from_u128(1),
                distance_km: DistanceUnit::Miles.to_km(10.0),
            })]
        );
    }

    #[test]
    fn service_opens_logs_and_closes() {
        let state = state_with_bike();
        let command = Command::Service {
            bike: "Commuter".into(),
            component: "kmc".into(),
            note: None,
        };

        let actions = actions_for(&command, &state).unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[2], AppAction::CloseComponent);
    }

    #[test]
    fn unknown_bike_is_an_error() {
        let command = Command::AddComponent {
            bike: "tandem".into(),
            kind: ComponentType::Saddle,
            name: "Brooks".into(),
        };
        assert!(actions_for(&command, &AppState::default()).is_err());
    }
}
