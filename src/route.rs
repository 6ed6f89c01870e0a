//! Numbered routes and the id → record table that owns them

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::RegistryError;
use crate::grid::TileCoord;
use crate::junction::{RouteId, MAX_ID};

/// A numbered highway. Its path lives on the junction legs carrying its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    /// Displayed number; editable
    pub number: u32,
    /// Heading treated as "forward" for mileage and signs; fixed at creation
    pub log_direction: Direction,
    pub start: TileCoord,
    pub end: TileCoord,
    /// Cached highway log text, rebuilt by the log builder
    #[serde(skip)]
    pub log: String,
}

impl Route {
    pub fn new(id: RouteId, number: u32, log_direction: Direction, start: TileCoord, end: TileCoord) -> Self {
        Self {
            id,
            number,
            log_direction,
            start,
            end,
            log: String::new(),
        }
    }
}

/// Route table indexed by id; ids are handed out densely from 1
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next registered route will get
    pub fn next_id(&self) -> Result<RouteId, RegistryError> {
        u16::try_from(self.routes.len() + 1)
            .ok()
            .and_then(RouteId::new)
            .ok_or(RegistryError::RoutesExhausted(MAX_ID))
    }

    /// Add a route and return its id
    pub fn register(
        &mut self,
        number: u32,
        log_direction: Direction,
        start: TileCoord,
        end: TileCoord,
    ) -> Result<RouteId, RegistryError> {
        let id = self.next_id()?;
        self.routes.push(Route::new(id, number, log_direction, start, end));
        Ok(id)
    }

    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.index())
    }

    pub fn get_mut(&mut self, id: RouteId) -> Option<&mut Route> {
        self.routes.get_mut(id.index())
    }

    /// First route showing `number`
    pub fn id_by_number(&self, number: u32) -> Option<RouteId> {
        self.routes.iter().find(|r| r.number == number).map(|r| r.id)
    }

    pub fn number_of(&self, id: RouteId) -> Option<u32> {
        self.get(id).map(|r| r.number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.routes.iter().map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
