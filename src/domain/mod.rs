pub mod backtest;
pub mod calendar;
pub mod calibration;
pub mod config_validation;
pub mod error;
pub mod generation;
pub mod market;
pub mod portfolio;
pub mod report;
pub mod resample;
pub mod series;
pub mod simulation;
pub mod strategy;
