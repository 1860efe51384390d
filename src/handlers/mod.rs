pub mod challenge;
pub mod config;
pub mod game;
pub mod leaderboard;
pub mod stats;
pub mod validation;
