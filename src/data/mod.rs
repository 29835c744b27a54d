pub mod content;
pub mod listing;
pub mod paths;
pub mod playlist;
pub mod watchstate;
