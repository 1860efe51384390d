pub mod catalog;
pub mod challenge;
pub mod leaderboard;
pub mod recorder;
pub mod round;
pub mod scheduler;
pub mod selection;
pub mod sessions;
pub mod username;
pub mod validator;
pub mod word_loader;
pub mod word_tracker;
