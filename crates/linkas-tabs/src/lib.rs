//! Linkas Tab Navigation
//!
//! Tabs are identified by numeric ids, like the host browser's tabs. A
//! resolved alias fans out over them: the first target honors the requested
//! [`OpenMode`], every further target lands in a background tab.

mod error;
mod manager;
mod navigator;
mod state;
mod tab;

pub use error::TabError;
pub use manager::{TabHost, TabManager};
pub use navigator::{OpenMode, TabNavigator, WindowDisposition};
pub use state::TabState;
pub use tab::{Tab, TabId};

pub type Result<T> = std::result::Result<T, TabError>;
