//! Error types for generation, configuration and editing

use std::io;

use thiserror::Error;

use crate::direction::Direction;
use crate::grid::TileCoord;

/// Failures building a world or loading its configuration
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid world size {width}x{height}: {reason}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("road layout failed: {0}")]
    Edit(#[from] EditError),
}

/// Why a leg cannot be paved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PaveRejection {
    #[error("tile {0} is water")]
    Water(TileCoord),
    #[error("tile {0} cannot take another leg heading {1}")]
    UnsuitableLeg(TileCoord, Direction),
    #[error("no tile {1} of {0}")]
    OffGrid(TileCoord, Direction),
    #[error("tile {0} on the far side is water")]
    NeighborWater(TileCoord),
    #[error("tile {0} on the far side cannot take a leg heading {1}")]
    NeighborUnsuitable(TileCoord, Direction),
    #[error("diagonal from {0} heading {1} would cross another road")]
    CrossesDiagonal(TileCoord, Direction),
}

/// Id space of a registry is used up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no route ids left (limit {0})")]
    RoutesExhausted(u16),
    #[error("no street ids left (limit {0})")]
    StreetsExhausted(u16),
}

/// A single edit step that was refused
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("path needs at least two tiles")]
    EmptyPath,
    #[error("tile {0} is off the grid")]
    OffGrid(TileCoord),
    #[error("tiles {0} and {1} are not adjacent")]
    NotAdjacent(TileCoord, TileCoord),
    #[error("cannot pave: {0}")]
    Rejected(#[from] PaveRejection),
    #[error("leg {1} of {0} has no pavement")]
    Unpaved(TileCoord, Direction),
    #[error("leg {1} of {0} already carries two routes")]
    LegFull(TileCoord, Direction),
    #[error("log direction must be north, east, south or west, not {0}")]
    InvalidLogDirection(Direction),
    #[error("route {number} is logged {log_direction}; segment heads {heading}")]
    WrongAxis {
        number: u32,
        log_direction: Direction,
        heading: Direction,
    },
    #[error("route {0} doesn't exist")]
    NoSuchRoute(u32),
    #[error("street name is empty")]
    EmptyName,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A multi-tile edit that stopped partway; the first `applied` steps stay applied
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("edit stopped after {applied} step(s): {source}")]
pub struct PathEditError {
    pub applied: usize,
    #[source]
    pub source: EditError,
}

/// Renaming a route, street or town
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
}
