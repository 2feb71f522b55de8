pub mod battery;
pub mod interval;
pub mod optimizer;
pub mod route;
pub mod runner;
pub mod schedule;
pub mod vehicle;
pub mod weather;
