// Library module for sfvcrc
// Re-exports modules for use in integration tests and the command-line tool

pub mod hash;
