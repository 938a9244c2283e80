//! Command line front end for the Umbra synthesis pipeline.

pub mod commands;
