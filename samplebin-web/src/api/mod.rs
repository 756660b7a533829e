//! HTTP API handlers for samplebin-web

pub mod form;
pub mod modify;
pub mod pages;
pub mod samples;
pub mod upload;
