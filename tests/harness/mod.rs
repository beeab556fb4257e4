//! Shared integration test harness.

#![allow(dead_code)]

pub mod temp_db;
