//! Per-category converters that turn intake files into markdown

pub mod docx;
pub mod external_parser;
mod handler;
pub mod markdown;
mod parser;

pub use docx::DocxHandler;
pub use external_parser::PdfHandler;
pub use handler::{Conversion, FileHandler, HandlerContext, HandlerSet, Route};
pub use markdown::MarkdownRenderer;
pub use parser::{CsvHandler, ImageHandler, JsonHandler, OtherHandler, SpreadsheetHandler, TextHandler};
