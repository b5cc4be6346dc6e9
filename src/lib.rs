//! Fetches movies, TV shows, people, companies, collections and movie lists
//! from TMDB and attaches ready-to-use image URLs to the responses.

pub mod app;
pub mod config;
pub mod enrich;
pub mod error;
pub mod images;
pub mod operation;
pub mod runner;
pub mod tmdb;

pub use enrich::{enrich, Resource};
pub use error::{NodeError, RunError};
pub use images::{image_urls, ImageCategory};
pub use operation::{ItemParams, MovieListType, Operation, Request};
pub use runner::{execute_item, run_items, ItemOutput, RunOptions};
pub use tmdb::{TmdbApi, TmdbClient};
