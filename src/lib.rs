//! Careful Tires: the economy engine of a tire-service clicker game.
//!
//! Every serviced wheel (a click) earns money scaled by how carefully the
//! player works; upgrades reshape the income formulas; passive income keeps
//! flowing between ticks and while the game is closed.
//!
//! The engine is platform-agnostic. Rendering, input wiring and the storage
//! transport are supplied by the host (see `frontend`).

pub mod config;
pub mod economy;
pub mod error;
pub mod frontend;
pub mod time;

pub use config::EngineConfig;
pub use economy::logic::{ActionResult, BonusRoll, OfflineGrant, PurchaseReceipt, RngRoll, TickOutcome};
pub use economy::save::{MemoryStorage, SaveStorage};
pub use economy::state::EconomyState;
pub use economy::view::{format_money, CareBand, EconomyView, UpgradeRow};
pub use economy::Economy;
pub use error::{PurchaseError, StorageError};
