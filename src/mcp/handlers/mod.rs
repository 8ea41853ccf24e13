pub mod commit;
pub mod common;
pub mod generate;
pub mod review;
