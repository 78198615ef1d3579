pub mod cascade;
pub mod inline;
pub mod matching;
pub mod selector;
pub mod syntax;
pub mod values;

// Re-exports so other crates can just use `css::...` nicely.
pub use cascade::computed_display;
pub use inline::{get_inline_style, inline_property, set_inline_property};
pub use matching::{query_selector, query_selector_all, select};
pub use selector::{SelectorError, SelectorList, Specificity, parse_selector_list};
pub use syntax::{Declaration, Rule, Stylesheet, parse_declarations, parse_stylesheet};
pub use values::{Display, parse_display};
