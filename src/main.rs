#[macro_use]
extern crate rocket;

use std::time::SystemTime;

use log::LevelFilter;
use rocket::{Build, Rocket};

use crate::config::FOLDER_SERVER_CONFIG;
use crate::folders::handler::{
    create_folder, delete_folder, get_all_folders, get_folder, get_root_folder, move_folder,
    rename_folder,
};
use crate::folders::service::FolderService;
use crate::folders::store::TreeStore;
use crate::guard::{HashedTokenResolver, IdentityResolver};
use crate::handler::api_handler::{health, not_found, unauthorized, unprocessable};
use crate::repository::{initialize_db, open_pool};

mod config;
mod folders;
mod guard;
mod handler;
mod model;
mod repository;
#[cfg(test)]
mod test;

#[launch]
fn rocket() -> Rocket<Build> {
    init_logger(&FOLDER_SERVER_CONFIG.log.level);
    let pool = match open_pool() {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to get a connection to the database!: {e}"),
    };
    if let Err(e) = initialize_db(&pool) {
        panic!("Failed to initialize the database!: {e}");
    }
    if FOLDER_SERVER_CONFIG.auth.tokens.is_empty() {
        log::warn!("No auth tokens are configured, so every folder request will be rejected");
    }
    let resolver = HashedTokenResolver::new(FOLDER_SERVER_CONFIG.auth.tokens.clone());
    build_rocket(FolderService::new(TreeStore::new(pool)), Box::new(resolver))
}

/// mounts every route on top of the passed service and identity resolver
pub fn build_rocket(service: FolderService, resolver: Box<dyn IdentityResolver>) -> Rocket<Build> {
    rocket::build()
        .manage(service)
        .manage(resolver)
        .mount(
            "/api",
            routes![
                health,
                get_root_folder,
                get_all_folders,
                get_folder,
                create_folder,
                rename_folder,
                move_folder,
                delete_folder
            ],
        )
        .register("/", catchers![unauthorized, not_found, unprocessable])
}

/// sends every log line to stdout with an rfc3339 timestamp. Unknown levels fall back to `info`
fn init_logger(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // rocket is chatty at info
        .level_for("rocket", LevelFilter::Warn)
        .level_for("_", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply();
    // a logger is already set when rocket is built more than once in the same process
    if let Err(e) = result {
        log::debug!("Logger was already initialized: {e}");
    }
}
