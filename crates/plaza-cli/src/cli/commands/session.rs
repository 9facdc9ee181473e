//! Session command handlers.

use anyhow::{Context, Result};
use plaza_core::session::{FileSessionStore, SessionStore, TOKEN_KEY};

pub fn logout() -> Result<()> {
    let store = FileSessionStore::default();
    store
        .clear(TOKEN_KEY)
        .with_context(|| format!("clear session at {}", store.path().display()))?;
    println!("Logged out.");
    Ok(())
}
