pub mod db;
pub mod hash;
mod result;

pub use result::ResultCache;
