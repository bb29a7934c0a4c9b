// Application layer - Use case interactors

pub mod cancel;
pub mod container;
pub mod inspect_interactor;
pub mod session;
pub mod split_interactor;

// Re-export interactors
pub use cancel::CancelFlag;
pub use container::{AppContainer, DefaultAppContainer};
pub use inspect_interactor::{InspectInteractor, MediaReport};
pub use session::{SessionState, SessionStore};
pub use split_interactor::{SplitInteractor, SplitOutcome, SplitRequest};
