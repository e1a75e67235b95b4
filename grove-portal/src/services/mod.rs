//! External collaborator clients
//!
//! Every third-party system the portal talks to sits behind one of
//! these clients: the Discord API, an OpenAI-compatible chat endpoint,
//! the NFT minting service, the announcement/email relays, and the
//! social (Twitter-style) platform. All of them are black boxes to the
//! progression engine.

pub mod chat;
pub mod discord;
pub mod nft;
pub mod notifier;
pub mod twitter;

pub use chat::{ChatClient, ChatError, ChatTurn};
pub use discord::{DiscordClient, GuildInfo, LookupOutcome};
pub use nft::{MintClient, MintError};
pub use notifier::Notifier;
pub use twitter::TwitterClient;
