//! Text format of temporal values.
//!
//! The grammar follows the usual temporal literal conventions:
//!
//! ```text
//! instant       value@timestamp
//! instant set   {value@t1, value@t2, ...}
//! sequence      [value@t1, value@t2, ...)      bounds may be '[' '(' and ']' ')'
//! sequence set  {[...], (...]}
//! ```
//!
//! Continuous domains with stepwise interpolation are prefixed by
//! `Interp=Stepwise;` and points with a non-zero SRID by `SRID=n;`.
//! Output is parseable back into an equal value.
use crate::base::BaseValue;
use crate::error::{Result, TemporaError};
use crate::temporal::{
    Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal,
};
use std::fmt;
use std::str::FromStr;
use tempora_types::Timestamp;

fn is_delimiter(c: char) -> bool {
    matches!(c, '@' | ',' | '[' | ']' | '(' | ')' | '{' | '}' | ';')
}

/// Cursor over a text literal.
#[derive(Debug, Clone)]
pub struct TextParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TextParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Next non-whitespace character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    /// Consume one character.
    pub fn advance(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    /// Consume `keyword` if it comes next, ignoring ASCII case.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let matches = self
            .rest()
            .get(..keyword.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(keyword));
        if matches {
            self.pos += keyword.len();
        }
        matches
    }

    /// Read up to the next delimiter or whitespace.
    pub fn take_token(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || is_delimiter(c))
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a value"));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Read through the next closing parenthesis, as in `POINT(1 2)`.
    pub fn take_through_close_paren(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(')')
            .ok_or_else(|| self.error("expected ')'"))?
            + 1;
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Read a double-quoted string with backslash escapes.
    pub fn take_quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut value = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                '"' => {
                    self.pos += offset + 1;
                    return Ok(value);
                }
                _ => value.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Read a timestamp ending at `,`, `]`, `)`, `}` or the end of input.
    pub fn read_timestamp(&mut self) -> Result<Timestamp> {
        self.skip_ws();
        let start = self.pos;
        let rest = self.rest();
        let end = rest
            .find(|c: char| matches!(c, ',' | ']' | ')' | '}'))
            .unwrap_or(rest.len());
        let text = rest[..end].trim();
        let t = Timestamp::parse(text).map_err(|e| TemporaError::parse(start, e.to_string()))?;
        self.pos += end;
        Ok(t)
    }

    pub fn error(&self, message: impl Into<String>) -> TemporaError {
        TemporaError::parse(self.pos, message)
    }

    /// Fail unless only whitespace remains.
    pub fn finish(&mut self) -> Result<()> {
        self.skip_ws();
        if self.pos < self.input.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(())
    }
}

fn write_instant<V: BaseValue>(inst: &TInstant<V>, out: &mut String) {
    inst.value().write_text(out);
    out.push('@');
    out.push_str(&inst.timestamp().to_string());
}

fn write_sequence<V: BaseValue>(seq: &TSequence<V>, out: &mut String) {
    out.push(if seq.lower_inc() { '[' } else { '(' });
    for (i, inst) in seq.instants().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_instant(inst, out);
    }
    out.push(if seq.upper_inc() { ']' } else { ')' });
}

fn write_prefix<V: BaseValue>(first: &V, interp: Option<Interpolation>, out: &mut String) {
    let srid = first.srid();
    if srid != 0 {
        out.push_str(&format!("SRID={};", srid));
    }
    if V::CONTINUOUS && interp == Some(Interpolation::Stepwise) {
        out.push_str("Interp=Stepwise;");
    }
}

/// Text form of a temporal value.
pub fn to_text<V: BaseValue>(temp: &Temporal<V>) -> String {
    let mut out = String::new();
    write_prefix(temp.start_instant().value(), temp.interpolation(), &mut out);
    match temp {
        Temporal::Instant(inst) => write_instant(inst, &mut out),
        Temporal::InstantSet(set) => {
            out.push('{');
            for (i, inst) in set.instants().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_instant(inst, &mut out);
            }
            out.push('}');
        }
        Temporal::Sequence(seq) => write_sequence(seq, &mut out),
        Temporal::SequenceSet(set) => {
            out.push('{');
            for (i, seq) in set.sequences().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_sequence(seq, &mut out);
            }
            out.push('}');
        }
    }
    out
}

fn read_instant<V: BaseValue>(parser: &mut TextParser<'_>, srid: Option<i32>) -> Result<TInstant<V>> {
    let mut value = V::read_text(parser)?;
    if let Some(srid) = srid {
        value.set_srid(srid);
    }
    parser.expect('@')?;
    let t = parser.read_timestamp()?;
    Ok(TInstant::new(value, t))
}

fn read_sequence<V: BaseValue>(
    parser: &mut TextParser<'_>,
    srid: Option<i32>,
    interp: Interpolation,
) -> Result<TSequence<V>> {
    let lower_inc = match parser.peek() {
        Some('[') => true,
        Some('(') => false,
        _ => return Err(parser.error("expected '[' or '('")),
    };
    parser.advance();
    let mut instants = vec![read_instant(parser, srid)?];
    while parser.eat(',') {
        instants.push(read_instant(parser, srid)?);
    }
    let upper_inc = match parser.peek() {
        Some(']') => true,
        Some(')') => false,
        _ => return Err(parser.error("expected ']' or ')'")),
    };
    parser.advance();
    TSequence::new(instants, lower_inc, upper_inc, interp)
}

/// Parse any temporal variant.
pub fn parse_temporal<V: BaseValue>(input: &str) -> Result<Temporal<V>> {
    let mut parser = TextParser::new(input);

    let srid = if parser.eat_keyword("SRID=") {
        let position = parser.position();
        let token = parser.take_token()?;
        let srid = token
            .parse::<i32>()
            .map_err(|_| TemporaError::parse(position, format!("invalid SRID '{}'", token)))?;
        parser.expect(';')?;
        Some(srid)
    } else {
        None
    };

    let stepwise = parser.eat_keyword("Interp=Stepwise;");
    if stepwise && !V::CONTINUOUS {
        return Err(parser.error(format!(
            "{} values are always stepwise",
            V::BASE_TYPE
        )));
    }
    let interp = if stepwise {
        Interpolation::Stepwise
    } else {
        Interpolation::default_for::<V>()
    };

    let temp = match parser.peek() {
        Some('{') => {
            parser.advance();
            if matches!(parser.peek(), Some('[') | Some('(')) {
                let mut sequences = vec![read_sequence(&mut parser, srid, interp)?];
                while parser.eat(',') {
                    sequences.push(read_sequence(&mut parser, srid, interp)?);
                }
                parser.expect('}')?;
                Temporal::SequenceSet(TSequenceSet::new(sequences)?)
            } else {
                let mut instants = vec![read_instant(&mut parser, srid)?];
                while parser.eat(',') {
                    instants.push(read_instant(&mut parser, srid)?);
                }
                parser.expect('}')?;
                Temporal::InstantSet(TInstantSet::new(instants)?)
            }
        }
        Some('[') | Some('(') => Temporal::Sequence(read_sequence(&mut parser, srid, interp)?),
        Some(_) => {
            let inst: TInstant<V> = read_instant(&mut parser, srid)?;
            inst.value().validate()?;
            Temporal::Instant(inst)
        }
        None => return Err(parser.error("empty input")),
    };
    parser.finish()?;
    Ok(temp)
}

impl<V: BaseValue> fmt::Display for Temporal<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self))
    }
}

impl<V: BaseValue> FromStr for Temporal<V> {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self> {
        parse_temporal(s)
    }
}

macro_rules! variant_text {
    ($ty:ident, $variant:ident, $name:literal) => {
        impl<V: BaseValue> fmt::Display for $ty<V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&to_text(&Temporal::$variant(self.clone())))
            }
        }

        impl<V: BaseValue> FromStr for $ty<V> {
            type Err = TemporaError;

            fn from_str(s: &str) -> Result<Self> {
                match parse_temporal::<V>(s)? {
                    Temporal::$variant(value) => Ok(value),
                    other => Err(TemporaError::parse(
                        0,
                        format!("expected {}, found {:?}", $name, other.subtype()),
                    )),
                }
            }
        }
    };
}

variant_text!(TInstant, Instant, "an instant");
variant_text!(TInstantSet, InstantSet, "an instant set");
variant_text!(TSequence, Sequence, "a sequence");
variant_text!(TSequenceSet, SequenceSet, "a sequence set");
