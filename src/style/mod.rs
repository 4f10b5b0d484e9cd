//! Inline-style model.
//!
//! An element's `style` attribute is modeled as an ordered list of
//! declarations, each a raw property/value pair with a priority. Parsing
//! is lenient in the manner of browsers: declarations that fail to parse
//! are dropped, never reported. Serialization emits `!important` for
//! priority declarations and round-trips through [`InlineStyle::parse`].

use cssparser::{
    AtRuleParser, DeclarationParser, Delimiter, ParseError, Parser, ParserInput,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

/// Declaration priority.
///
/// `Important` is the strongest override the styling mechanism has: a
/// value written at this priority wins over any other inline or
/// sheet-based declaration for the same property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum Priority {
    #[default]
    Normal,
    Important,
}

/// A fixed style property record, used for the constant declarations the
/// enforcer and the hook write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct StyleProperty {
    pub name: &'static str,
    pub value: &'static str,
    pub priority: Priority,
}

/// One parsed declaration from a `style` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub priority: Priority,
}

/// Ordered inline-style declaration list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        let mut decl_parser = StyleAttrParser { style: &mut style };

        for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
            // Ignore errors - lenient parsing
            let _ = result;
        }

        style
    }

    /// Set a property, unconditionally overwriting any previous value and
    /// priority. A property set for the first time is appended; an
    /// existing property keeps its position in the list.
    pub fn set(&mut self, name: &str, value: &str, priority: Priority) {
        let name = name.to_ascii_lowercase();
        match self
            .declarations
            .iter_mut()
            .find(|d| d.name == name)
        {
            Some(decl) => {
                decl.value = value.to_string();
                decl.priority = priority;
            }
            None => self.declarations.push(Declaration {
                name,
                value: value.to_string(),
                priority,
            }),
        }
    }

    /// Look up a declaration by property name.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        let name = name.to_ascii_lowercase();
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Remove a declaration; returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let before = self.declarations.len();
        self.declarations.retain(|d| d.name != name);
        self.declarations.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize back to `style` attribute text.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for decl in &self.declarations {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&decl.name);
            out.push_str(": ");
            out.push_str(&decl.value);
            if decl.priority == Priority::Important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }
}

/// Declaration-list parser that keeps raw value text.
struct StyleAttrParser<'a> {
    style: &'a mut InlineStyle,
}

impl<'i> AtRuleParser<'i> for StyleAttrParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for StyleAttrParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for StyleAttrParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let value_start = input.position();
        input.parse_until_before(Delimiter::Bang, |i| -> Result<(), ParseError<'i, ()>> {
            while i.next().is_ok() {}
            Ok(())
        })?;
        let value = input.slice_from(value_start).trim().to_string();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }

        let priority = if input.try_parse(cssparser::parse_important).is_ok() {
            Priority::Important
        } else {
            Priority::Normal
        };
        input.expect_exhausted()?;

        self.style.set(&name, &value, priority);
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for StyleAttrParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let style = InlineStyle::parse("color: red; background: blue");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color").unwrap().value, "red");
        assert_eq!(style.get("color").unwrap().priority, Priority::Normal);
        assert_eq!(style.get("background").unwrap().value, "blue");
    }

    #[test]
    fn test_parse_important() {
        let style = InlineStyle::parse("color: #ffffff !important; width: 10px");
        assert_eq!(style.get("color").unwrap().priority, Priority::Important);
        assert_eq!(style.get("width").unwrap().priority, Priority::Normal);
    }

    #[test]
    fn test_parse_preserves_function_values() {
        let style = InlineStyle::parse(
            "background: linear-gradient(135deg, #06b6d4 0%, #0891b2 100%) !important",
        );
        let decl = style.get("background").unwrap();
        assert_eq!(
            decl.value,
            "linear-gradient(135deg, #06b6d4 0%, #0891b2 100%)"
        );
        assert_eq!(decl.priority, Priority::Important);
    }

    #[test]
    fn test_invalid_declarations_are_dropped() {
        let style = InlineStyle::parse("color:; border: 1px solid red; :garbage");
        assert!(style.get("color").is_none());
        assert_eq!(style.get("border").unwrap().value, "1px solid red");
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut style = InlineStyle::parse("color: red; width: 10px");
        style.set("color", "green", Priority::Important);
        assert_eq!(style.len(), 2);
        // Position preserved: color still serializes first.
        assert!(style.to_css().starts_with("color: green !important;"));
    }

    #[test]
    fn test_property_names_are_case_insensitive() {
        let mut style = InlineStyle::new();
        style.set("Color", "red", Priority::Normal);
        assert_eq!(style.get("color").unwrap().value, "red");
        style.set("COLOR", "blue", Priority::Normal);
        assert_eq!(style.len(), 1);
    }

    #[test]
    fn test_to_css_round_trips() {
        let mut style = InlineStyle::new();
        style.set(
            "background",
            "linear-gradient(135deg, #06b6d4 0%, #0891b2 100%)",
            Priority::Important,
        );
        style.set("font-weight", "600", Priority::Important);
        style.set("width", "10px", Priority::Normal);

        let text = style.to_css();
        let reparsed = InlineStyle::parse(&text);
        assert_eq!(reparsed, style);
    }

    #[test]
    fn test_remove() {
        let mut style = InlineStyle::parse("color: red; width: 10px");
        assert!(style.remove("color"));
        assert!(!style.remove("color"));
        assert_eq!(style.len(), 1);
    }
}
