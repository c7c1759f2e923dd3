//! `amperex route <PATH>`: what opening a path would show.

use std::sync::Arc;

use amperex_core::navigation::{NavigationLog, RouteGuard};
use amperex_core::session::{FileSessionStore, SessionStore};
use anyhow::Result;

pub fn resolve(path: &str) -> Result<()> {
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::default_location());
    let redirects = NavigationLog::new();

    if let Some(route) = RouteGuard::new(store).admit(path, &redirects) {
        println!("{} ({})", route.path(), route.title());
        return Ok(());
    }

    if let Some(redirect) = redirects.last() {
        match &redirect.from {
            Some(from) => println!("redirect -> {} (from {from})", redirect.to.path()),
            None => println!("redirect -> {}", redirect.to.path()),
        }
    }
    Ok(())
}
