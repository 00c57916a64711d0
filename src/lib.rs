//! enemacquire - ENEM exam and answer key acquisition.
//!
//! Crawls the INEP "provas e gabaritos" listing with a headless browser and
//! stores the blue-booklet exams and answer keys of every year under
//! `data/{year}/`.

pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod utils;
