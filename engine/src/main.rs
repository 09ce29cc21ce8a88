//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use clap::Parser;
use partledger_common::{KindId, PartId};
use partledger_engine::catalog::PartCatalog;
use partledger_engine::config::{Arguments, Command, Configuration};
use partledger_engine::ecs::components::{Location, Part};
use partledger_engine::ecs::events::EventBus;
use partledger_engine::ecs::systems::PartsSystem;
use partledger_engine::ecs::{EcsEntity, GameWorld};
use partledger_engine::persistence::{load_world, save_world};
use partledger_engine::presentation::PartReport;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .init();

    // Load environment variables from .env file if specified
    if let Some(ref env_file) = arguments.env_file {
        if std::path::Path::new(env_file).exists() {
            tracing::debug!("Loading environment variables from file: {}", env_file);
            dotenv::from_filename(env_file).ok();
        }
    } else {
        tracing::debug!("Loading environment variables from default file");
        dotenv::dotenv().ok();
    }

    // Load configuration from a file with environment variable substitution
    let config = Configuration::load(&arguments.config_file)?;
    tracing::debug!("Configuration loaded: {:?}", config);

    tracing::info!("Loading part catalog from {}", config.catalog.path());
    let catalog = PartCatalog::load(config.catalog.path())?;
    tracing::info!("Catalog holds {} kinds", catalog.len());

    let save_path = arguments
        .save_file
        .clone()
        .unwrap_or_else(|| config.saves.path().to_string());

    let event_bus = EventBus::new();
    event_bus.subscribe(|event| tracing::debug!("{:?}", event));
    let mut system = PartsSystem::new(event_bus.clone());
    let mut world = GameWorld::new();

    if std::path::Path::new(&save_path).exists() {
        load_world(&mut world, &mut system, &catalog, &save_path)?;
    } else {
        tracing::info!("No save at {}, starting with an empty world", save_path);
    }

    let changed = match arguments.command.unwrap_or(Command::Inspect) {
        Command::Inspect => false,
        Command::Make { kind } => {
            let part = catalog.make(&KindId::new(kind))?;
            let entity = system.spawn_part(&mut world, part, Location::default());
            print_part(&world, entity);
            true
        }
        Command::Split { owner, part } => {
            let owner = find(&system, owner)?;
            let entity = system.split_off_subpart(&mut world, owner, PartId::from_uuid(part))?;
            print_part(&world, owner);
            print_part(&world, entity);
            true
        }
        Command::Add { owner, item } => {
            let owner = find(&system, owner)?;
            system.add_existing_subpart(&mut world, owner, PartId::from_uuid(item))?;
            print_part(&world, owner);
            true
        }
        Command::Destroy { part } => {
            let entity = find(&system, part)?;
            let destroyed = system.destroy_part(&mut world, entity)?;
            println!("Destroyed {} parts.", destroyed);
            true
        }
    };
    event_bus.process_events();

    if changed {
        save_world(&world, &save_path)?;
    } else {
        let mut reports: Vec<PartReport> = world
            .query::<(&Part, &Location)>()
            .iter()
            .map(|(part, _)| PartReport::of(part))
            .collect();
        reports.sort_by_key(|report| report.id);
        for report in reports {
            println!("{}", report);
        }
    }

    Ok(())
}

fn find(system: &PartsSystem, id: uuid::Uuid) -> Result<EcsEntity, String> {
    system
        .find(PartId::from_uuid(id))
        .ok_or_else(|| format!("No placed part with id {}", id))
}

fn print_part(world: &GameWorld, entity: EcsEntity) {
    if let Ok(part) = world.get::<&Part>(entity) {
        println!("{}", PartReport::of(&part));
    }
}
