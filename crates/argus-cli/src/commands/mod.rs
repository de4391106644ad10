pub mod dispatch;
pub mod merge;
pub mod run;
pub mod schema;
pub mod score;
pub mod shared;
pub mod status;
