//! Selector parsing.
//!
//! Grammar (a practical subset of Selectors Level 3):
//!
//! ```text
//! list     := complex ( ',' complex )*
//! complex  := compound ( combinator? compound )*      combinator: ' ' | '>' | '+' | '~'
//! compound := ( type | '*' )? ( '#' ident | '.' ident | '[' attr ']' | ':' pseudo )*
//! pseudo   := first-child | last-child | only-child | empty | root | not( compound )
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("expected an identifier at offset {0}")]
    ExpectedIdent(usize),
    #[error("unsupported pseudo-class `:{0}`")]
    UnknownPseudo(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Compounds joined by combinators; `combinators[i]` sits between `compounds[i]` and
/// `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub type_selector: Option<TypeSelector>,
    pub simple: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelector {
    Universal,
    /// Lowercased tag name.
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Lowercased attribute name.
    pub name: String,
    pub matcher: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Root,
    Not(Box<Compound>),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Specificity(pub u16, pub u16, pub u16); // (id, class, type)

impl Compound {
    pub fn specificity(&self) -> Specificity {
        let mut spec = match self.type_selector {
            Some(TypeSelector::Tag(_)) => Specificity(0, 0, 1),
            _ => Specificity::default(),
        };
        for simple in &self.simple {
            let add = match simple {
                SimpleSelector::Id(_) => Specificity(1, 0, 0),
                SimpleSelector::Class(_) | SimpleSelector::Attribute(_) => Specificity(0, 1, 0),
                SimpleSelector::Pseudo(PseudoClass::Not(inner)) => inner.specificity(),
                SimpleSelector::Pseudo(_) => Specificity(0, 1, 0),
            };
            spec = Specificity(spec.0 + add.0, spec.1 + add.1, spec.2 + add.2);
        }
        spec
    }
}

impl ComplexSelector {
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .map(Compound::specificity)
            .fold(Specificity::default(), |a, b| {
                Specificity(a.0 + b.0, a.1 + b.1, a.2 + b.2)
            })
    }
}

pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut parser = Parser { input, pos: 0 };
    let mut out = Vec::new();
    loop {
        parser.skip_whitespace();
        out.push(parser.complex()?);
        parser.skip_whitespace();
        match parser.peek() {
            None => break,
            Some(',') => {
                parser.bump();
            }
            Some(found) => {
                return Err(SelectorError::Unexpected {
                    found,
                    offset: parser.pos,
                });
            }
        }
    }
    Ok(SelectorList(out))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                offset: self.pos,
            },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.type_selector = Some(TypeSelector::Universal);
        } else if self.at_ident_start() {
            compound.type_selector = Some(TypeSelector::Tag(self.ident()?.to_ascii_lowercase()));
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    compound
                        .simple
                        .push(SimpleSelector::Attribute(self.attribute()?));
                }
                Some(':') => {
                    self.bump();
                    compound.simple.push(SimpleSelector::Pseudo(self.pseudo()?));
                }
                _ => break,
            }
        }
        if compound.type_selector.is_none() && compound.simple.is_empty() {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let op = match (self.peek(), self.peek_second()) {
            (Some(']'), _) => {
                self.bump();
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                });
            }
            (Some('='), _) => Some(AttrOp::Equals),
            (Some('~'), Some('=')) => Some(AttrOp::Includes),
            (Some('|'), Some('=')) => Some(AttrOp::DashMatch),
            (Some('^'), Some('=')) => Some(AttrOp::Prefix),
            (Some('$'), Some('=')) => Some(AttrOp::Suffix),
            (Some('*'), Some('=')) => Some(AttrOp::Substring),
            _ => None,
        };
        let Some(op) = op else {
            return Err(self.unexpected());
        };
        if op != AttrOp::Equals {
            self.bump();
        }
        self.bump();
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.string(quote)?
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttributeSelector {
            name,
            matcher: Some((op, value)),
        })
    }

    fn pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "empty" => PseudoClass::Empty,
            "root" => PseudoClass::Root,
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                PseudoClass::Not(Box::new(inner))
            }
            _ => return Err(SelectorError::UnknownPseudo(name)),
        };
        Ok(pseudo)
    }

    fn at_ident_start(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() || c == '\\' => true,
            Some('-') => self
                .peek_second()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()),
            _ => false,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        if !self.at_ident_start() {
            return Err(SelectorError::ExpectedIdent(self.pos));
        }
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                out.push(self.escape()?);
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                self.bump();
                out.push(c);
            } else {
                break;
            }
        }
        Ok(out)
    }

    // After a backslash: up to six hex digits plus one optional space, or any literal char.
    fn escape(&mut self) -> Result<char, SelectorError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return self.bump().ok_or(SelectorError::UnexpectedEnd);
        }
        let value = u32::from_str_radix(&self.input[start..self.pos], 16)
            .map_err(|_| SelectorError::ExpectedIdent(start))?;
        if self.peek() == Some(' ') {
            self.bump();
        }
        Ok(char::from_u32(value)
            .filter(|c| *c != '\0')
            .unwrap_or('\u{fffd}'))
    }

    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(input: &str) -> ComplexSelector {
        let mut list = parse_selector_list(input).unwrap();
        assert_eq!(list.0.len(), 1, "{input}");
        list.0.remove(0)
    }

    #[test]
    fn parses_compound_class_chain() {
        let sel = one(".a.b.c");
        assert_eq!(sel.compounds.len(), 1);
        assert_eq!(
            sel.compounds[0].simple,
            vec![
                SimpleSelector::Class("a".into()),
                SimpleSelector::Class("b".into()),
                SimpleSelector::Class("c".into()),
            ]
        );
    }

    #[test]
    fn parses_combinators() {
        let sel = one("div.x > p + span ~ em  a");
        assert_eq!(
            sel.combinators,
            vec![
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
                Combinator::Descendant,
            ]
        );
        assert_eq!(sel.compounds[0].type_selector, Some(TypeSelector::Tag("div".into())));
    }

    #[test]
    fn parses_attribute_forms() {
        let sel = one(r#"a[href^="https:"][ data-x ][rel~=nofollow]"#);
        let attrs: Vec<_> = sel.compounds[0]
            .simple
            .iter()
            .map(|s| match s {
                SimpleSelector::Attribute(a) => (a.name.clone(), a.matcher.clone()),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("href".into(), Some((AttrOp::Prefix, "https:".into()))),
                ("data-x".into(), None),
                ("rel".into(), Some((AttrOp::Includes, "nofollow".into()))),
            ]
        );
    }

    #[test]
    fn parses_lists_and_pseudo_classes() {
        let list = parse_selector_list("li:first-child, p:not(.ad), :root").unwrap();
        assert_eq!(list.0.len(), 3);
        assert_eq!(
            list.0[1].compounds[0].simple,
            vec![SimpleSelector::Pseudo(PseudoClass::Not(Box::new(Compound {
                type_selector: None,
                simple: vec![SimpleSelector::Class("ad".into())],
            })))]
        );
    }

    #[test]
    fn handles_escapes() {
        let sel = one(r"#\31 23.a\:b");
        assert_eq!(
            sel.compounds[0].simple,
            vec![
                SimpleSelector::Id("123".into()),
                SimpleSelector::Class("a:b".into()),
            ]
        );
    }

    #[test]
    fn reports_syntax_errors() {
        assert_eq!(parse_selector_list("  "), Err(SelectorError::Empty));
        assert_eq!(parse_selector_list("#1abc"), Err(SelectorError::ExpectedIdent(1)));
        assert_eq!(parse_selector_list("a,"), Err(SelectorError::UnexpectedEnd));
        assert_eq!(
            parse_selector_list("div:hover"),
            Err(SelectorError::UnknownPseudo("hover".into()))
        );
        assert_eq!(
            parse_selector_list("[x"),
            Err(SelectorError::UnexpectedEnd)
        );
        assert!(matches!(
            parse_selector_list("a >> b"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
    }

    #[test]
    fn specificity_counts_each_part() {
        assert_eq!(one("#a.b c").specificity(), Specificity(1, 1, 1));
        assert_eq!(one("p:not(#x)").specificity(), Specificity(1, 0, 1));
        assert_eq!(one("*[href]").specificity(), Specificity(0, 1, 0));
    }
}
