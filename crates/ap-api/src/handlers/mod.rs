pub mod health;
pub mod recommendations;
