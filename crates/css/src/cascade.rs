use crate::inline::inline_declarations;
use crate::selector::Specificity;
use crate::syntax::Stylesheet;
use crate::values::{Display, parse_display};
use html::{Document, Id};

// Cascade priority, compared lexicographically: important beats normal, then inline beats
// author rules, then specificity, then source order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    important: bool,
    inline: bool,
    specificity: Specificity,
    order: u32,
}

fn cascade_property<T>(
    doc: &Document,
    sheet: &Stylesheet,
    id: Id,
    property: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let mut winner: Option<(Priority, T)> = None;
    let mut offer = |priority: Priority, value: &str| {
        // Invalid values are dropped before they can win.
        let Some(parsed) = parse(value) else {
            return;
        };
        if winner.as_ref().is_none_or(|(best, _)| priority >= *best) {
            winner = Some((priority, parsed));
        }
    };

    for (order, rule) in sheet.rules.iter().enumerate() {
        let specificity = rule
            .selectors
            .0
            .iter()
            .filter(|complex| complex.matches(doc, id))
            .map(|complex| complex.specificity())
            .max();
        let Some(specificity) = specificity else {
            continue;
        };
        for declaration in rule.declarations.iter().filter(|d| d.name == property) {
            offer(
                Priority {
                    important: declaration.important,
                    inline: false,
                    specificity,
                    order: order as u32,
                },
                &declaration.value,
            );
        }
    }

    for declaration in inline_declarations(doc, id)
        .iter()
        .filter(|d| d.name == property)
    {
        offer(
            Priority {
                important: declaration.important,
                inline: true,
                specificity: Specificity::default(),
                order: u32::MAX,
            },
            &declaration.value,
        );
    }

    winner.map(|(_, value)| value)
}

/// Computed `display` of an element, the equivalent of `getComputedStyle(el).display`.
///
/// `display` is not inherited, so an element inside a hidden ancestor still reports its
/// own value.
pub fn computed_display(doc: &Document, sheet: &Stylesheet, id: Id) -> Display {
    cascade_property(doc, sheet, id, "display", parse_display)
        .unwrap_or_else(|| default_display_for(doc, id))
}

// User-agent defaults for the elements pages commonly carry.
fn default_display_for(doc: &Document, id: Id) -> Display {
    let Some(tag) = doc.tag_name(id) else {
        return Display::None;
    };
    if doc.has_attr(id, "hidden") {
        return Display::None;
    }
    match tag {
        "head" | "script" | "style" | "title" | "meta" | "link" | "template" | "base"
        | "noscript" => Display::None,
        "a" | "abbr" | "b" | "big" | "br" | "cite" | "code" | "em" | "i" | "img" | "input"
        | "kbd" | "label" | "mark" | "q" | "s" | "samp" | "select" | "small" | "span"
        | "strong" | "sub" | "sup" | "textarea" | "time" | "u" | "var" | "button" | "svg"
        | "iframe" | "video" | "audio" | "canvas" => Display::Inline,
        "li" => Display::ListItem,
        "table" => Display::Table,
        "thead" => Display::TableHeaderGroup,
        "tbody" => Display::TableRowGroup,
        "tfoot" => Display::TableFooterGroup,
        "tr" => Display::TableRow,
        "td" | "th" => Display::TableCell,
        "colgroup" => Display::TableColumnGroup,
        "col" => Display::TableColumn,
        "caption" => Display::TableCaption,
        // Everything else we treat as block
        _ => Display::Block,
    }
}
