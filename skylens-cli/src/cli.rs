use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use skylens_core::{
    City, Config, ContactField, ContactPresenter, FilePreferences, PreferencesStore,
    SimulatedSubmitter, TemperatureUnit, ViewState, WeatherPresenter, provider_from_config,
};
use std::sync::Arc;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skylens", version, about = "Current weather for Canadian cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for the saved city.
    Show {
        /// City name or place code, e.g. "Ottawa" or "CAON0512". Saved for next time.
        #[arg(long)]
        city: Option<String>,

        /// "metric" or "imperial". Saved for next time.
        #[arg(long)]
        unit: Option<String>,
    },

    /// List the supported cities.
    Cities,

    /// Switch between metric and imperial, then show the weather.
    ToggleUnit,

    /// Send a contact message. Missing fields are prompted for.
    Contact {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Configure the weather API endpoint and request timeout.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let prefs = Arc::new(FilePreferences::open_default()?);
        tracing::debug!(command = ?self.command, "dispatching command");

        match self.command {
            Command::Show { city, unit } => {
                let city = city.as_deref().map(City::try_from).transpose()?;
                let unit = unit.as_deref().map(TemperatureUnit::try_from).transpose()?;

                if let Some(unit) = unit {
                    tracing::debug!(%unit, "saving unit from command line");
                    prefs.save_preferred_unit(unit);
                }

                let presenter = weather_presenter(&prefs)?;
                match city {
                    Some(city) if city != presenter.selected_city() => {
                        presenter.select_city(city).await
                    }
                    _ => presenter.fetch_weather().await,
                }

                print_weather(&presenter)
            }
            Command::Cities => {
                let saved = prefs.last_city();
                for city in City::all() {
                    let marker = if *city == saved { "*" } else { " " };
                    println!("{marker} {:<10} {}", city.display_name(), city.provider_code());
                }
                Ok(())
            }
            Command::ToggleUnit => {
                let presenter = weather_presenter(&prefs)?;
                presenter.toggle_unit().await;
                print_weather(&presenter)
            }
            Command::Contact { name, email, phone } => {
                let config = prefs.config();
                send_contact(&config, name, email, phone).await
            }
            Command::Configure => configure(prefs.config()),
        }
    }
}

fn weather_presenter(prefs: &Arc<FilePreferences>) -> Result<WeatherPresenter> {
    let config = prefs.config();
    tracing::debug!(base_url = %config.api.base_url, "building weather service");
    let service = provider_from_config(&config)?;
    Ok(WeatherPresenter::new(service, prefs.clone()))
}

fn print_weather(presenter: &WeatherPresenter) -> Result<()> {
    print!("{}", render_weather(presenter)?);
    Ok(())
}

/// Text shown for a loaded presenter; an error state becomes the command's error.
fn render_weather(presenter: &WeatherPresenter) -> Result<String> {
    match presenter.state() {
        ViewState::Loaded => {
            let symbol = presenter.unit_symbol();
            let mut out = format!(
                "{}\n  {}\n  Temperature: {}{symbol} (feels like {}{symbol})\n  Updated:     {}\n",
                presenter.city_name(),
                presenter.condition(),
                presenter.temperature(),
                presenter.feels_like(),
                presenter.last_updated(),
            );
            if let Some(icon) = presenter.icon_url() {
                out.push_str(&format!("  Icon:        {icon}\n"));
            }
            Ok(out)
        }
        ViewState::Error(message) => {
            tracing::debug!(%message, "weather fetch ended in error state");
            bail!(message)
        }
        ViewState::Loading => bail!("Weather data is still loading"),
    }
}

async fn send_contact(
    config: &Config,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    let interactive = name.is_none() || email.is_none() || phone.is_none();
    tracing::debug!(interactive, "starting contact form");

    let submitter = Arc::new(SimulatedSubmitter::new(config.contact.submission_delay()));
    let presenter = ContactPresenter::new(submitter);

    presenter.set_name(value_or_prompt(name, "Name:")?);
    presenter.set_email(value_or_prompt(email, "Email:")?);
    presenter.set_phone(value_or_prompt(phone, "Phone:")?);

    loop {
        if presenter.submit_form().await {
            println!("Thank you! Your message has been sent.");
            return Ok(());
        }

        let errors = presenter.validation_errors();
        for err in &errors {
            eprintln!("  - {err}");
        }

        if !interactive {
            bail!("Contact form has {} invalid field(s)", errors.len());
        }

        let current = presenter.contact();
        for err in &errors {
            match err.field() {
                ContactField::Name => presenter.set_name(prompt("Name:", &current.name)?),
                ContactField::Email => presenter.set_email(prompt("Email:", &current.email)?),
                ContactField::Phone => presenter.set_phone(prompt("Phone:", &current.phone)?),
            }
        }
    }
}

fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label, ""),
    }
}

fn prompt(label: &str, initial: &str) -> Result<String> {
    Text::new(label)
        .with_initial_value(initial)
        .prompt()
        .with_context(|| format!("Failed to read '{label}' from terminal"))
}

fn configure(mut config: Config) -> Result<()> {
    config.api.base_url = Text::new("Weather API base URL:")
        .with_initial_value(&config.api.base_url)
        .prompt()
        .context("Failed to read base URL from terminal")?;

    config.api.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.api.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read timeout from terminal")?;

    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
