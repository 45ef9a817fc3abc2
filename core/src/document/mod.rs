//! Wire documents: rendering a [`Graph`](crate::graph::Graph) into a
//! [`Document`](hypermedia_types::Document), link generation, and parsing
//! incoming documents back into domain types.

mod assembler;
mod links;
mod parser;

pub use assembler::{RenderContext, render, render_null};
pub use links::{DefaultUrlPathBuilder, UrlPathBuilder, join_url, page_link};
pub use parser::{flatten, parse, parse_str, validate};
