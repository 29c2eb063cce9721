//! Algorithms for the BULWARK battle-management engine.
//!
//! Threat clustering, interceptor assignment, ballistic launch planning,
//! and PN/APN guidance, coordinated by the `BattleManager` context object.
//! Everything is synchronous and deterministic given a seed; the host owns
//! the tick loop, physics integration, and rendering.

pub mod assignment;
pub mod clustering;
pub mod guidance;
pub mod kdtree;
pub mod launch;
pub mod manager;
pub mod prediction;

#[cfg(test)]
mod tests;
