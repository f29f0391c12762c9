//! Wire types for the WebPredictor API shared across crates.

mod auth;
mod health;
mod limits;
mod model_type;
mod tabular;

pub use auth::*;
pub use health::*;
pub use limits::*;
pub use model_type::*;
pub use tabular::*;
