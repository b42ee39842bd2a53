//! Interactive intergalactic barman backed by the Star Wars API (https://swapi.dev).
//!
//! Run with `OPENAI_API_KEY=... cargo run --example swapi_barman`; type `quit` to leave.
//! Set `AGENT_CONFIG=path/to/agent.toml` to override the defaults.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use mini_agent::prelude::*;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

const BASE_URL: &str = "https://swapi.dev/api";

const SYSTEM_MESSAGE: &str = "You are an intergalactic barman. You know a lot about planets, people, and starships.
When someone asks you a question, you answer it to the best of your ability.
If you lack some data you always try to use your memory to find the answer or use your tools.
You talk with the style of star wars characters, and you are a bit of a philosopher.";

async fn get_data(path: &str) -> Result<Value, reqwest::Error> {
    let url = format!("{BASE_URL}/{path}/");
    tracing::debug!(%url, "swapi request");
    reqwest::get(url).await?.error_for_status()?.json().await
}

async fn get_list(resource: &str) -> Result<Value, reqwest::Error> {
    let mut page = get_data(resource).await?;
    Ok(page.get_mut("results").map(Value::take).unwrap_or(Value::Null))
}

#[command(service = "swapi", name = "getPlanets", description = "Get the list of planets.")]
async fn get_planets() -> Result<Value, reqwest::Error> {
    get_list("planets").await
}

#[command(
    service = "swapi",
    name = "getPlanet",
    description = "Get a planet by Id.",
    params(id = "The id of the planet to get.")
)]
async fn get_planet(id: String) -> Result<Value, reqwest::Error> {
    get_data(&format!("planets/{id}")).await
}

#[command(service = "swapi", name = "getPeople", description = "Get the list of people.")]
async fn get_people() -> Result<Value, reqwest::Error> {
    get_list("people").await
}

#[command(
    service = "swapi",
    name = "getPerson",
    description = "Get a person by Id.",
    params(id = "The id of the person to get.")
)]
async fn get_person(id: String) -> Result<Value, reqwest::Error> {
    get_data(&format!("people/{id}")).await
}

#[command(service = "swapi", name = "getStarships", description = "Get the list of starships.")]
async fn get_starships() -> Result<Value, reqwest::Error> {
    get_list("starships").await
}

#[command(
    service = "swapi",
    name = "getStarship",
    description = "Get a starship by Id.",
    params(id = "The id of the starship to get.")
)]
async fn get_starship(id: String) -> Result<Value, reqwest::Error> {
    get_data(&format!("starships/{id}")).await
}

#[command(service = "swapi", name = "getVehicles", description = "Get the list of vehicles.")]
async fn get_vehicles() -> Result<Value, reqwest::Error> {
    get_list("vehicles").await
}

#[command(
    service = "swapi",
    name = "getVehicle",
    description = "Get a vehicle by Id.",
    params(id = "The id of the vehicle to get.")
)]
async fn get_vehicle(id: String) -> Result<Value, reqwest::Error> {
    get_data(&format!("vehicles/{id}")).await
}

#[command(service = "swapi", name = "getSpecies", description = "Get the list of species.")]
async fn get_species() -> Result<Value, reqwest::Error> {
    get_list("species").await
}

#[command(
    service = "swapi",
    name = "getSpecie",
    description = "Get a specie by Id.",
    params(id = "The id of the specie to get.")
)]
async fn get_specie(id: String) -> Result<Value, reqwest::Error> {
    get_data(&format!("species/{id}")).await
}

fn swapi_services() -> anyhow::Result<ServiceRegistry> {
    let functions: Vec<Arc<dyn ServiceFunction>> = vec![
        Arc::new(GetPlanetsCommand),
        Arc::new(GetPlanetCommand),
        Arc::new(GetPeopleCommand),
        Arc::new(GetPersonCommand),
        Arc::new(GetStarshipsCommand),
        Arc::new(GetStarshipCommand),
        Arc::new(GetVehiclesCommand),
        Arc::new(GetVehicleCommand),
        Arc::new(GetSpeciesCommand),
        Arc::new(GetSpecieCommand),
    ];

    let mut registry = ServiceRegistry::new();
    for function in functions {
        registry.register(function)?;
    }
    Ok(registry)
}

fn load_config() -> anyhow::Result<AgentConfig> {
    let config = match std::env::var("AGENT_CONFIG") {
        Ok(path) => AgentConfig::from_file(&path).with_context(|| format!("loading {path}"))?,
        Err(_) => AgentConfig::default().with_temperature(0.0).with_debug(true),
    };
    Ok(config.with_env().with_system_message(SYSTEM_MESSAGE))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let mut agent = Agent::openai(load_config()?, swapi_services()?)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == "quit" {
            break;
        }

        match agent.process_message(line).await {
            Ok(response) => println!("Bot: {response}"),
            Err(e) => eprintln!("Agent error: {e}"),
        }
    }

    println!("Tokens used: {} (${:.4})", agent.total_tokens(), agent.price());
    Ok(())
}
