mod state;

pub use state::{AppState, SessionCache};
