pub mod analytics;
pub mod answer;
pub mod chart;
pub mod detection;
pub mod field;
pub mod raw;
pub mod report;
pub mod settings;
pub mod validation;
