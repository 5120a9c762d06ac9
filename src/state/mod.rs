//! State module for the dashboard data slices
//!
//! This module provides the state types the store exposes to observers.
//!
//! # Components
//!
//! - `Domain`: Identifies one of the five analysis views
//! - `DomainSlice`: Tracks data, loading flag and error of one domain
//! - `CrawlState`: Tracks the lifecycle of the crawl job being driven

mod crawl_state;
mod domain;
mod domain_slice;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState, STARTING_MESSAGE};
pub use domain::Domain;
pub use domain_slice::DomainSlice;
