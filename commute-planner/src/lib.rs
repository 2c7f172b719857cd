//! Drive + transit commute planner.
//!
//! Reads a list of home addresses and answers: "Which station should I
//! drive to, and how long will the whole commute take?" Results are
//! written as a CSV plus an HTML map report and a PDF.

pub mod app;
pub mod batch;
pub mod cache;
pub mod config;
pub mod domain;
pub mod input;
pub mod maps;
pub mod planner;
pub mod report;
