//! Terminal surfaces: ticker, report list, submission and friends

pub mod disclaimer;
pub mod list;
pub mod locate;
pub mod nearby;
pub mod rates;
pub mod setup;
pub mod submit;
pub mod ticker;
pub mod ui;
pub mod watch;
