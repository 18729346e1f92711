pub mod envy_free;
pub mod generate;
pub mod report;
pub mod solve;
pub mod verify;
