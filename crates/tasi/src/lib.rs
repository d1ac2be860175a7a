pub mod collector;
pub mod export;
mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use collector::{CollectError, Collector, DetailWarning, Progress, ScrapeOutcome, ScrapeReport};
pub use parser::ParseError;
pub use scraper::{PageSource, ScraperError, WebScraper};
pub use types::{MemberRecord, MemberTable};

pub const LISTING_URL: &str = "http://tasi.org/en/member/index_member_02.asp";
pub const DETAIL_URL_TEMPLATE: &str = "http://tasi.org/en/member/index_member_02.asp?F={}";
pub const CSV_FILE_NAME: &str = "tasi_member_data.csv";
