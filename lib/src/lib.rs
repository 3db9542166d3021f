pub mod airing;
pub mod config;
pub mod reconciler;
pub mod sonarr;

pub use config::{Config, WaitStrategy};
pub use reconciler::{Outcome, ReconcileError, ReconcileTiming, SeasonReconciler};
pub use sonarr::{LibraryManager, SonarrClient, SonarrError};
