//! Island road network generator library
//!
//! Builds an island with towns and a numbered highway network, keeps highway
//! logs with mileposts, and exposes the editing surface used by map tools.

pub mod ascii;
pub mod direction;
pub mod editing;
pub mod error;
pub mod export;
pub mod generation;
pub mod grid;
pub mod highway_log;
pub mod junction;
pub mod naming;
pub mod params;
pub mod route;
pub mod seeds;
pub mod street;
pub mod tilemap;
pub mod town;
pub mod traversal;
pub mod world;
