//! Universe listing port.

use crate::domain::error::ScreenerError;
use crate::domain::universe::UniverseEntry;

pub trait UniversePort {
    fn list_universe(&self) -> Result<Vec<UniverseEntry>, ScreenerError>;
}
