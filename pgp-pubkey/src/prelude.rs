//! Common imports for quick starts.

pub use crate::{Cert, Error, KeySource, Result};

// Backends
pub use crate::{Discovery, HkpClient, LocalKeyring};
