pub mod db;
pub mod guidance_llm;
pub mod scripture_http;

pub use db::DbAdapter;
pub use guidance_llm::OpenAiGuidanceAdapter;
pub use scripture_http::QuranComAdapter;
