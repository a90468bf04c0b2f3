pub mod check;
pub mod config;
pub mod probe;
pub mod run;
