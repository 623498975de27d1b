pub mod extract;
pub mod fetch;
pub mod installer;
pub mod profile;
pub mod progress;
