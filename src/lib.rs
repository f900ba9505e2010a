//! Alchemailyst: Google OAuth2 sessions plus a fallback AI completion gateway
//! for an email assistant.
//!
//! # Quick start
//!
//! ```no_run
//! use alchemailyst::api::AiGateway;
//! use alchemailyst::auth::SessionManager;
//! use alchemailyst::config::load_config;
//!
//! # async fn example() -> Result<(), alchemailyst::error::Error> {
//! let config = load_config(None)?;
//!
//! let session = SessionManager::from_config(&config);
//! session.initialize().await?;
//!
//! let gateway = AiGateway::from_config(&config);
//! let text = gateway.generate("Summarize my week", None).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod prompt;
#[cfg(test)]
pub mod testsupport;
pub mod types;
