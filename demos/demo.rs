// (C) Copyright IBM Corp. 2025.
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

use std::{env, io::Write, path::Path, sync::Arc, time::Duration};

use dotenvy::dotenv;
use std::error::Error;
use toggle_repository::{
    FileBackupStorage, RepositoryBuilder, RepositoryEvent, RepositoryState,
};

fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let url = env::var("TOGGLES_URL").expect("TOGGLES_URL should be set.");
    let token = env::var("TOGGLES_TOKEN").expect("TOGGLES_TOKEN should be set.");
    let toggle_name = env::var("TOGGLE_NAME").expect("TOGGLE_NAME should be set.");
    let backup_dir =
        env::var("BACKUP_DIR").unwrap_or_else(|_| env::temp_dir().display().to_string());

    let storage = Arc::new(FileBackupStorage::new(Path::new(&backup_dir), "demo")?);
    let repository = RepositoryBuilder::new("demo", &url)
        .authorization(&token)
        .refresh_interval(Duration::from_secs(5))
        .storage(storage)
        .build()?;
    let events = repository.subscribe();

    print!("Waiting for storage...");
    std::io::stdout().flush()?;
    repository.wait_for_state(RepositoryState::Polling, Duration::from_secs(30))?;
    println!(" DONE");
    println!("Toggles are fetched every 5 seconds.");
    println!("Try changing the toggle on the server.");

    for event in events {
        match event {
            RepositoryEvent::Updated => match repository.get_toggle(&toggle_name)? {
                Some(toggle) => {
                    println!("Toggle name: {}", toggle.get_name());
                    println!("Is toggle enabled: {}", toggle.is_enabled());
                    for strategy in &toggle.strategies {
                        println!("  strategy {} {:?}", strategy.name, strategy.parameters);
                    }
                }
                None => println!("Toggle '{toggle_name}' does not exist"),
            },
            RepositoryEvent::Failed(error) => {
                println!("There was an error fetching the toggles. Error {error}");
            }
        }
    }
    Ok(())
}
