pub mod migrate;
pub mod schemas;
pub mod serve;
pub mod token;
