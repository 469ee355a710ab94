pub mod events;
pub mod session;

pub use events::{ChangeAction, ChangeBus, DataChanged};
pub use session::{DocumentBinder, EditState, SUBMIT_CANCELLED};
