//! Backend status overview (`gifts sources`).
//!
//! Lists each configured backend, whether a full `list()` against it
//! succeeds and how many participant records it holds. Each backend is
//! probed on its own, without the fallback chain, so an outage shows up
//! here instead of being papered over.

use anyhow::Result;

use gift_survey_core::Store;

use crate::config::Config;
use crate::local_store::JsonFileStore;
use crate::remote_store::RemoteDocumentStore;

pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<10} {:<40} {:<8} RECORDS", "BACKEND", "LOCATION", "STATUS");

    let local = JsonFileStore::new(&config.storage.path);
    let location = config.storage.path.display().to_string();
    if config.storage.path.exists() {
        print_probe(&local, &location);
    } else {
        println!("{:<10} {:<40} {:<8} -", "local", location, "EMPTY");
    }

    match (&config.remote, config.remote()) {
        (None, _) => println!("{:<10} {:<40} {:<8} -", "remote", "-", "NOT CONFIGURED"),
        (Some(remote), None) => {
            println!("{:<10} {:<40} {:<8} -", "remote", remote.base_url, "DISABLED")
        }
        (Some(_), Some(remote_cfg)) => match RemoteDocumentStore::from_config(remote_cfg) {
            Ok(remote) => {
                let location = format!(
                    "{}/{}",
                    remote_cfg.base_url.trim_end_matches('/'),
                    remote_cfg.collection
                );
                print_probe(&remote, &location);
            }
            Err(e) => println!(
                "{:<10} {:<40} {:<8} {}",
                "remote", remote_cfg.base_url, "ERROR", e
            ),
        },
    }

    Ok(())
}

fn print_probe(store: &dyn Store, location: &str) {
    match store.list() {
        Ok(records) => println!(
            "{:<10} {:<40} {:<8} {}",
            store.name(),
            location,
            "OK",
            records.len()
        ),
        Err(e) => println!("{:<10} {:<40} {:<8} {}", store.name(), location, "ERROR", e),
    }
}
